//! PostgreSQL error types

use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostgresError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server message plus its `DETAIL:` line, as psql prints them
pub fn database_message(err: &sqlx::Error) -> String {
    let sqlx::Error::Database(db) = err else {
        return err.to_string();
    };
    match db.try_downcast_ref::<PgDatabaseError>() {
        Some(pg) => match pg.detail() {
            Some(detail) => format!("{}\nDETAIL:  {}", pg.message(), detail),
            None => pg.message().to_string(),
        },
        None => db.message().to_string(),
    }
}
