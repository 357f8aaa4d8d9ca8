//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{EntityStore, PostgresService};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub database: Arc<PostgresService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Migrate) => Self::migrate(&cli_config).await,
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let database = Arc::new(Self::connect(&config).await?);
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            database,
        })
    }

    /// Open the pool; the schema is brought up to date before it is returned
    async fn connect(config: &AppConfig) -> Result<PostgresService> {
        PostgresService::init(
            &config.database.postgres,
            config.database.migrations_dir.as_deref(),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to initialize PostgreSQL at {}:{}/{}",
                config.database.postgres.host,
                config.database.postgres.port,
                config.database.postgres.database
            )
        })
    }

    /// Apply pending migrations and exit
    async fn migrate(cli: &CliConfig) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let database = Self::connect(&config).await?;

        match database
            .last_migration()
            .await
            .context("Failed to read migration history")?
        {
            Some(last) => tracing::info!(
                version = last.version,
                name = %last.name,
                "Database schema is up to date"
            ),
            None => tracing::warn!("No migrations recorded"),
        }

        database.close().await;
        Ok(())
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        let pg = &app.config.database.postgres;
        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &format!("{}:{}/{}", pg.host, pg.port, pg.database),
            app.config
                .database
                .migrations_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .as_deref(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_health_check_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}
