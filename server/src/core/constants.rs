// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Beerpy";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "beerpy";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".beerpy";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "beerpy.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BEERPY_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "BEERPY_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "BEERPY_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BEERPY_LOG";

/// Default log filter when neither BEERPY_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,beerpy=info";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default request body limit (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Pagination
// =============================================================================

/// Rows returned by a list endpoint when no `limit` is given
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Upper bound for `limit` and for configured page sizes
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Environment variables for per-entity default page sizes
pub const ENV_PAGE_LIMIT_BEERS: &str = "BEERPY_PAGE_LIMIT_BEERS";
pub const ENV_PAGE_LIMIT_ORDERS: &str = "BEERPY_PAGE_LIMIT_ORDERS";
pub const ENV_PAGE_LIMIT_STOCK: &str = "BEERPY_PAGE_LIMIT_STOCK";
pub const ENV_PAGE_LIMIT_USERS: &str = "BEERPY_PAGE_LIMIT_USERS";

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// PostgreSQL
// =============================================================================

/// Environment variable for the full PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "BEERPY_POSTGRES_URL";

/// Environment variables for individual connection parts
pub const ENV_POSTGRES_HOST: &str = "BEERPY_POSTGRES_HOST";
pub const ENV_POSTGRES_PORT: &str = "BEERPY_POSTGRES_PORT";
pub const ENV_POSTGRES_USER: &str = "BEERPY_POSTGRES_USER";
pub const ENV_POSTGRES_PASSWORD: &str = "BEERPY_POSTGRES_PASSWORD";
pub const ENV_POSTGRES_DATABASE: &str = "BEERPY_POSTGRES_DATABASE";

/// Environment variable for the external migrations folder
pub const ENV_MIGRATIONS_DIR: &str = "BEERPY_MIGRATIONS_DIR";

pub const POSTGRES_DEFAULT_HOST: &str = "localhost";
pub const POSTGRES_DEFAULT_PORT: u16 = 5432;
pub const POSTGRES_DEFAULT_USER: &str = "beerpy";
pub const POSTGRES_DEFAULT_DATABASE: &str = "beerpy";

/// Default maximum connections in pool
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default minimum connections kept warm
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 2;

/// Default connection acquire timeout (seconds)
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout (seconds)
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default maximum connection lifetime (seconds)
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Default statement timeout (seconds)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Interval between pool health checks (seconds)
pub const POSTGRES_HEALTH_CHECK_INTERVAL_SECS: u64 = 60;
