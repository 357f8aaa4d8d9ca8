//! Unified error type for the data layer

use thiserror::Error;

/// Errors returned by an [`EntityStore`](super::EntityStore)
#[derive(Error, Debug)]
pub enum DataError {
    #[error("PostgreSQL error: {0}")]
    Postgres(sqlx::Error),

    /// Write rejected by a store-enforced constraint; the text names it
    #[error("Constraint violation: {0}")]
    Constraint(String),

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

impl DataError {
    /// Raw failure text as reported by the database
    ///
    /// PostgreSQL errors render as the primary message followed by the
    /// `DETAIL:` line, which is what constraint classification reads.
    pub fn database_message(&self) -> String {
        match self {
            Self::Postgres(e) => crate::data::postgres::error::database_message(e),
            Self::Constraint(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(e: sqlx::Error) -> Self {
        Self::Postgres(e)
    }
}

/// Convert from the PostgreSQL service error
impl From<crate::data::postgres::PostgresError> for DataError {
    fn from(e: crate::data::postgres::PostgresError) -> Self {
        match e {
            crate::data::postgres::PostgresError::Database(e) => Self::Postgres(e),
            crate::data::postgres::PostgresError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            crate::data::postgres::PostgresError::Config(msg) => Self::Config(msg),
            crate::data::postgres::PostgresError::Io(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_error_display() {
        let err = DataError::MigrationFailed {
            version: 2,
            name: "add_styles".to_string(),
            error: "syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_styles) failed: syntax error"
        );
    }

    #[test]
    fn test_constraint_message_is_raw_text() {
        let err = DataError::Constraint("violates check constraint \"beers_abv_check\"".into());
        assert_eq!(
            err.database_message(),
            "violates check constraint \"beers_abv_check\""
        );
    }

    #[test]
    fn test_non_database_errors_use_display() {
        let err = DataError::Config("missing URL".into());
        assert_eq!(err.database_message(), "Configuration error: missing URL");
    }

    #[test]
    fn test_from_postgres_error() {
        let err: DataError = crate::data::postgres::PostgresError::Config("bad".into()).into();
        assert!(matches!(err, DataError::Config(msg) if msg == "bad"));
    }
}
