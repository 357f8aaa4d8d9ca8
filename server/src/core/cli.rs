use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    APP_NAME_LOWER, ENV_CONFIG, ENV_HOST, ENV_MIGRATIONS_DIR, ENV_PAGE_LIMIT_BEERS,
    ENV_PAGE_LIMIT_ORDERS, ENV_PAGE_LIMIT_STOCK, ENV_PAGE_LIMIT_USERS, ENV_PORT,
    ENV_POSTGRES_DATABASE, ENV_POSTGRES_HOST, ENV_POSTGRES_PASSWORD, ENV_POSTGRES_PORT,
    ENV_POSTGRES_URL, ENV_POSTGRES_USER,
};

#[derive(Parser)]
#[command(name = APP_NAME_LOWER)]
#[command(version, about = "REST backend for beers, stock, users and orders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Database options
    /// PostgreSQL connection URL (overrides the individual parts)
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,

    /// PostgreSQL host
    #[arg(long, global = true, env = ENV_POSTGRES_HOST)]
    pub postgres_host: Option<String>,

    /// PostgreSQL port
    #[arg(long, global = true, env = ENV_POSTGRES_PORT)]
    pub postgres_port: Option<u16>,

    /// PostgreSQL user
    #[arg(long, global = true, env = ENV_POSTGRES_USER)]
    pub postgres_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, global = true, env = ENV_POSTGRES_PASSWORD, hide_env_values = true)]
    pub postgres_password: Option<String>,

    /// PostgreSQL database name
    #[arg(long, global = true, env = ENV_POSTGRES_DATABASE)]
    pub postgres_database: Option<String>,

    /// Folder of NNNN_name.sql migration files
    #[arg(long, global = true, env = ENV_MIGRATIONS_DIR)]
    pub migrations_dir: Option<PathBuf>,

    // Pagination options
    /// Default page size for /beers
    #[arg(long, global = true, env = ENV_PAGE_LIMIT_BEERS)]
    pub page_limit_beers: Option<u32>,

    /// Default page size for /orders
    #[arg(long, global = true, env = ENV_PAGE_LIMIT_ORDERS)]
    pub page_limit_orders: Option<u32>,

    /// Default page size for /stock
    #[arg(long, global = true, env = ENV_PAGE_LIMIT_STOCK)]
    pub page_limit_stock: Option<u32>,

    /// Default page size for /users
    #[arg(long, global = true, env = ENV_PAGE_LIMIT_USERS)]
    pub page_limit_users: Option<u32>,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Apply pending database migrations and exit
    Migrate,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub postgres_url: Option<String>,
    pub postgres_host: Option<String>,
    pub postgres_port: Option<u16>,
    pub postgres_user: Option<String>,
    pub postgres_password: Option<String>,
    pub postgres_database: Option<String>,
    pub migrations_dir: Option<PathBuf>,
    pub page_limit_beers: Option<u32>,
    pub page_limit_orders: Option<u32>,
    pub page_limit_stock: Option<u32>,
    pub page_limit_users: Option<u32>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            postgres_url: cli.postgres_url,
            postgres_host: cli.postgres_host,
            postgres_port: cli.postgres_port,
            postgres_user: cli.postgres_user,
            postgres_password: cli.postgres_password,
            postgres_database: cli.postgres_database,
            migrations_dir: cli.migrations_dir,
            page_limit_beers: cli.page_limit_beers,
            page_limit_orders: cli.page_limit_orders,
            page_limit_stock: cli.page_limit_stock,
            page_limit_users: cli.page_limit_users,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["beerpy"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_migrate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "beerpy",
            "migrate",
            "--postgres-url",
            "postgres://u:p@db/beerpy",
            "--migrations-dir",
            "./migrations",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
        let config = CliConfig::from(cli);
        assert_eq!(config.postgres_url.as_deref(), Some("postgres://u:p@db/beerpy"));
        assert_eq!(config.migrations_dir, Some(PathBuf::from("./migrations")));
    }

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "beerpy",
            "start",
            "-H",
            "0.0.0.0",
            "-p",
            "9000",
            "--page-limit-beers",
            "50",
        ])
        .unwrap();
        let config = CliConfig::from(cli);
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.page_limit_beers, Some(50));
        assert_eq!(config.page_limit_users, None);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["beerpy", "--port", "http"]).is_err());
    }
}
