//! PostgreSQL migration management
//!
//! Handles the baseline schema and optional external migration files.
//! External files live in one folder and are named `NNNN_name.sql`; each is
//! applied once, in version order, inside its own transaction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sqlx::PgPool;

use super::error::PostgresError;
use super::schema::{BASELINE_NAME, SCHEMA, SCHEMA_VERSION};
use crate::utils::crypto::sha256_hex;

/// Migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub version: i32,
    pub name: String,
    pub path: PathBuf,
}

/// Run all pending migrations
pub async fn run_migrations(
    pool: &PgPool,
    migrations_dir: Option<&Path>,
) -> Result<(), PostgresError> {
    // Check if schema_version table exists
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    let current_version: Option<i32> = if table_exists {
        sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
            .fetch_optional(pool)
            .await?
    } else {
        None
    };

    match current_version {
        None => {
            tracing::debug!("Applying initial PostgreSQL schema v{}", SCHEMA_VERSION);
            apply_initial_schema(pool).await?;
        }
        Some(v) => {
            tracing::debug!("PostgreSQL schema is at v{}", v);
        }
    }

    if let Some(dir) = migrations_dir {
        let files = discover_migrations(dir)?;
        apply_external_migrations(pool, &files).await?;
    }

    Ok(())
}

/// Apply the initial schema
async fn apply_initial_schema(pool: &PgPool) -> Result<(), PostgresError> {
    let start = Instant::now();
    let now = chrono::Utc::now().timestamp();

    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| PostgresError::MigrationFailed {
            version: SCHEMA_VERSION,
            name: BASELINE_NAME.to_string(),
            error: e.to_string(),
        })?;

    let elapsed = start.elapsed().as_millis() as i32;

    sqlx::query(
        "INSERT INTO schema_version (id, version, applied_at, description)
         VALUES (1, $1, $2, 'Initial schema')
         ON CONFLICT (id) DO UPDATE SET version = $1, applied_at = $2",
    )
    .bind(SCHEMA_VERSION)
    .bind(now)
    .execute(pool)
    .await?;

    record_migration(pool, SCHEMA_VERSION, BASELINE_NAME, now, SCHEMA, elapsed).await?;

    tracing::debug!("PostgreSQL schema v{} applied successfully", SCHEMA_VERSION);
    Ok(())
}

async fn record_migration<'e, E>(
    executor: E,
    version: i32,
    name: &str,
    applied_at: i64,
    sql: &str,
    execution_time_ms: i32,
) -> Result<(), PostgresError>
where
    E: sqlx::postgres::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, success)
         VALUES ($1, $2, $3, $4, $5, TRUE)
         ON CONFLICT (version) DO NOTHING",
    )
    .bind(version)
    .bind(name)
    .bind(applied_at)
    .bind(sha256_hex(sql))
    .bind(execution_time_ms)
    .execute(executor)
    .await?;
    Ok(())
}

/// Apply external migrations whose version is not yet recorded
async fn apply_external_migrations(
    pool: &PgPool,
    files: &[MigrationFile],
) -> Result<(), PostgresError> {
    let applied: HashSet<i32> = sqlx::query_scalar::<_, i32>("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();

    for file in files.iter().filter(|f| !applied.contains(&f.version)) {
        let sql = tokio::fs::read_to_string(&file.path).await?;
        let failed = |e: sqlx::Error| PostgresError::MigrationFailed {
            version: file.version,
            name: file.name.clone(),
            error: e.to_string(),
        };

        let start = Instant::now();
        let now = chrono::Utc::now().timestamp();

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(&sql).execute(&mut *tx).await.map_err(failed)?;
        let elapsed = start.elapsed().as_millis() as i32;

        record_migration(&mut *tx, file.version, &file.name, now, &sql, elapsed).await?;
        sqlx::query(
            "UPDATE schema_version SET version = GREATEST(version, $1), applied_at = $2 WHERE id = 1",
        )
        .bind(file.version)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await.map_err(failed)?;

        tracing::debug!(
            "PostgreSQL migration v{} ({}) applied in {}ms",
            file.version,
            file.name,
            elapsed
        );
    }

    Ok(())
}

/// List `NNNN_name.sql` files in a folder, ordered by version
///
/// Other files are skipped. Two files with the same version are an error.
pub fn discover_migrations(dir: &Path) -> Result<Vec<MigrationFile>, PostgresError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match parse_file_name(file_name) {
            Some((version, name)) => files.push(MigrationFile {
                version,
                name,
                path,
            }),
            None => tracing::debug!(file = %file_name, "Skipping non-migration file"),
        }
    }

    files.sort_by_key(|f| f.version);
    if let Some(pair) = files.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(PostgresError::Config(format!(
            "Duplicate migration version {:04}: {} and {}",
            pair[0].version, pair[0].name, pair[1].name
        )));
    }
    Ok(files)
}

/// `0002_add_styles.sql` -> (2, "add_styles")
fn parse_file_name(file_name: &str) -> Option<(i32, String)> {
    let stem = file_name.strip_suffix(".sql")?;
    let (prefix, name) = stem.split_once('_')?;
    if prefix.len() != 4 || !prefix.bytes().all(|b| b.is_ascii_digit()) || name.is_empty() {
        return None;
    }
    Some((prefix.parse().ok()?, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("0002_add_styles.sql"),
            Some((2, "add_styles".to_string()))
        );
        assert_eq!(
            parse_file_name("0010_seed.sql"),
            Some((10, "seed".to_string()))
        );
    }

    #[test]
    fn test_parse_file_name_rejects_others() {
        assert_eq!(parse_file_name("README.md"), None);
        assert_eq!(parse_file_name("2_short.sql"), None);
        assert_eq!(parse_file_name("00a2_bad.sql"), None);
        assert_eq!(parse_file_name("0002_.sql"), None);
        assert_eq!(parse_file_name("0002-add.sql"), None);
        assert_eq!(parse_file_name("0002_add.txt"), None);
    }

    #[test]
    fn test_discover_migrations_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0003_third.sql"), "SELECT 3;").unwrap();
        std::fs::write(dir.path().join("0002_second.sql"), "SELECT 2;").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("0004_dir.sql")).unwrap();

        let files = discover_migrations(dir.path()).unwrap();
        let versions: Vec<i32> = files.iter().map(|f| f.version).collect();
        assert_eq!(versions, vec![2, 3]);
        assert_eq!(files[0].name, "second");
    }

    #[test]
    fn test_discover_migrations_duplicate_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0002_a.sql"), "").unwrap();
        std::fs::write(dir.path().join("0002_b.sql"), "").unwrap();

        let err = discover_migrations(dir.path()).unwrap_err();
        assert!(matches!(err, PostgresError::Config(msg) if msg.contains("0002")));
    }

    #[test]
    fn test_discover_migrations_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_migrations(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PostgresError::Io(_)));
    }
}
