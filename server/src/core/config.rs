use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, MAX_PAGE_LIMIT,
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_DATABASE, POSTGRES_DEFAULT_HOST,
    POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS, POSTGRES_DEFAULT_MAX_CONNECTIONS,
    POSTGRES_DEFAULT_MAX_LIFETIME_SECS, POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_PORT,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS, POSTGRES_DEFAULT_USER,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Extra CORS origins besides the bound host
    pub cors_origins: Option<Vec<String>>,
}

/// PostgreSQL configuration section (from JSON config file)
#[derive(Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    /// Full connection URL; takes precedence over the individual parts
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Maximum number of connections in the pool (default: 20)
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm (default: 2)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds (default: 1800)
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds (default: 60)
    pub statement_timeout_secs: Option<u64>,
}

impl fmt::Debug for PostgresFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresFileConfig")
            .field("url", &self.url.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish_non_exhaustive()
    }
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub postgres: Option<PostgresFileConfig>,
    /// Folder of `NNNN_name.sql` files applied after the baseline schema
    pub migrations_dir: Option<String>,
}

/// Default page size per entity
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaginationFileConfig {
    pub beers: Option<u32>,
    pub orders: Option<u32>,
    pub stock: Option<u32>,
    pub users: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub pagination: Option<PaginationFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Overwrite `current` when `other` is set
fn merge_value<T: fmt::Debug>(current: &mut Option<T>, other: Option<T>, key: &str) {
    if other.is_some() {
        tracing::trace!(value = ?other, "Merging {}", key);
        *current = other;
    }
}

/// Like [`merge_value`] but never logs the value
fn merge_secret(current: &mut Option<String>, other: Option<String>, key: &str) {
    if other.is_some() {
        tracing::trace!(value = "***", "Merging {}", key);
        *current = other;
    }
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Keys at the top level that no section claims
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(|k| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let keys = self.unknown_fields();
        if !keys.is_empty() {
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            merge_value(&mut current.host, server.host, "server.host");
            merge_value(&mut current.port, server.port, "server.port");
            merge_value(
                &mut current.cors_origins,
                server.cors_origins,
                "server.cors_origins",
            );
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            merge_value(
                &mut current.migrations_dir,
                database.migrations_dir,
                "database.migrations_dir",
            );
            if let Some(pg) = database.postgres {
                let current_pg = current
                    .postgres
                    .get_or_insert_with(PostgresFileConfig::default);
                merge_secret(&mut current_pg.url, pg.url, "database.postgres.url");
                merge_value(&mut current_pg.host, pg.host, "database.postgres.host");
                merge_value(&mut current_pg.port, pg.port, "database.postgres.port");
                merge_value(&mut current_pg.user, pg.user, "database.postgres.user");
                merge_secret(
                    &mut current_pg.password,
                    pg.password,
                    "database.postgres.password",
                );
                merge_value(
                    &mut current_pg.database,
                    pg.database,
                    "database.postgres.database",
                );
                merge_value(
                    &mut current_pg.max_connections,
                    pg.max_connections,
                    "database.postgres.max_connections",
                );
                merge_value(
                    &mut current_pg.min_connections,
                    pg.min_connections,
                    "database.postgres.min_connections",
                );
                merge_value(
                    &mut current_pg.acquire_timeout_secs,
                    pg.acquire_timeout_secs,
                    "database.postgres.acquire_timeout_secs",
                );
                merge_value(
                    &mut current_pg.idle_timeout_secs,
                    pg.idle_timeout_secs,
                    "database.postgres.idle_timeout_secs",
                );
                merge_value(
                    &mut current_pg.max_lifetime_secs,
                    pg.max_lifetime_secs,
                    "database.postgres.max_lifetime_secs",
                );
                merge_value(
                    &mut current_pg.statement_timeout_secs,
                    pg.statement_timeout_secs,
                    "database.postgres.statement_timeout_secs",
                );
            }
        }

        if let Some(pagination) = other.pagination {
            let current = self
                .pagination
                .get_or_insert_with(PaginationFileConfig::default);
            merge_value(&mut current.beers, pagination.beers, "pagination.beers");
            merge_value(&mut current.orders, pagination.orders, "pagination.orders");
            merge_value(&mut current.stock, pagination.stock, "pagination.stock");
            merge_value(&mut current.users, pagination.users, "pagination.users");
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// PostgreSQL configuration (final/runtime)
#[derive(Clone)]
pub struct PostgresConfig {
    /// Full connection URL, used as-is when set
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds
    pub statement_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: POSTGRES_DEFAULT_HOST.to_string(),
            port: POSTGRES_DEFAULT_PORT,
            user: POSTGRES_DEFAULT_USER.to_string(),
            password: String::new(),
            database: POSTGRES_DEFAULT_DATABASE.to_string(),
            max_connections: POSTGRES_DEFAULT_MAX_CONNECTIONS,
            min_connections: POSTGRES_DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
            idle_timeout_secs: POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
            max_lifetime_secs: POSTGRES_DEFAULT_MAX_LIFETIME_SECS,
            statement_timeout_secs: POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
        }
    }
}

impl PostgresConfig {
    /// Connection URL, built from the parts when no explicit URL is set
    ///
    /// User and password are percent-encoded.
    pub fn connection_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim().to_string();
        }
        let user = utf8_percent_encode(&self.user, NON_ALPHANUMERIC);
        let credentials = if self.password.is_empty() {
            user.to_string()
        } else {
            format!(
                "{}:{}",
                user,
                utf8_percent_encode(&self.password, NON_ALPHANUMERIC)
            )
        };
        format!(
            "postgres://{}@{}:{}/{}",
            credentials, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &self.url.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Database configuration
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub postgres: PostgresConfig,
    pub migrations_dir: Option<PathBuf>,
}

/// Default page size per entity; `None` falls back to the entity default
#[derive(Debug, Clone, Default)]
pub struct PaginationConfig {
    pub beers: Option<u32>,
    pub orders: Option<u32>,
    pub stock: Option<u32>,
    pub users: Option<u32>,
}

impl PaginationConfig {
    fn entries(&self) -> [(&'static str, Option<u32>); 4] {
        [
            ("beers", self.beers),
            ("orders", self.orders),
            ("stock", self.stock),
            ("users", self.users),
        ]
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.beerpy/beerpy.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            postgres_host = %config.database.postgres.host,
            postgres_database = %config.database.postgres.database,
            migrations_dir = ?config.database.migrations_dir,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults, merged file config and CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_pg = file_database.postgres.unwrap_or_default();
        let file_pagination = file_config.pagination.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
            cors_origins: file_server.cors_origins.unwrap_or_default(),
        };

        let postgres = PostgresConfig {
            url: cli.postgres_url.clone().or(file_pg.url),
            host: cli
                .postgres_host
                .clone()
                .or(file_pg.host)
                .unwrap_or_else(|| POSTGRES_DEFAULT_HOST.to_string()),
            port: cli
                .postgres_port
                .or(file_pg.port)
                .unwrap_or(POSTGRES_DEFAULT_PORT),
            user: cli
                .postgres_user
                .clone()
                .or(file_pg.user)
                .unwrap_or_else(|| POSTGRES_DEFAULT_USER.to_string()),
            password: cli
                .postgres_password
                .clone()
                .or(file_pg.password)
                .unwrap_or_default(),
            database: cli
                .postgres_database
                .clone()
                .or(file_pg.database)
                .unwrap_or_else(|| POSTGRES_DEFAULT_DATABASE.to_string()),
            max_connections: file_pg
                .max_connections
                .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
            min_connections: file_pg
                .min_connections
                .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
            acquire_timeout_secs: file_pg
                .acquire_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout_secs: file_pg
                .idle_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime_secs: file_pg
                .max_lifetime_secs
                .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
            statement_timeout_secs: file_pg
                .statement_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
        };

        let migrations_dir = cli
            .migrations_dir
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_database.migrations_dir.as_deref().map(expand_path));

        let pagination = PaginationConfig {
            beers: cli.page_limit_beers.or(file_pagination.beers),
            orders: cli.page_limit_orders.or(file_pagination.orders),
            stock: cli.page_limit_stock.or(file_pagination.stock),
            users: cli.page_limit_users.or(file_pagination.users),
        };

        Self {
            server,
            database: DatabaseConfig {
                postgres,
                migrations_dir,
            },
            pagination,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        for (entity, limit) in self.pagination.entries() {
            if let Some(limit) = limit
                && !(1..=MAX_PAGE_LIMIT).contains(&limit)
            {
                anyhow::bail!(
                    "Configuration error: pagination.{} must be between 1 and {} (got {})",
                    entity,
                    MAX_PAGE_LIMIT,
                    limit
                );
            }
        }

        let pg = &self.database.postgres;
        if pg.url.is_none() && (pg.host.is_empty() || pg.database.is_empty()) {
            anyhow::bail!(
                "Configuration error: database.postgres needs a url or a host and database"
            );
        }
        if pg.min_connections > pg.max_connections {
            tracing::warn!(
                min = pg.min_connections,
                max = pg.max_connections,
                "database.postgres.min_connections exceeds max_connections, capping"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.beerpy/beerpy.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
