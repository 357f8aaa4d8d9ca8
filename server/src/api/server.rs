//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::routes::crud::CrudState;
use super::routes::{beers, health, migrations, orders, stock, users};
use crate::core::CoreApp;
use crate::core::config::AppConfig;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::EntityStore;

pub struct ApiServer {
    app: CoreApp,
}

/// Build the full HTTP router over a store
pub fn router(store: Arc<dyn EntityStore>, config: &AppConfig) -> Router {
    let allowed_origins = AllowedOrigins::new(
        &config.server.host,
        config.server.port,
        &config.server.cors_origins,
    );
    let pages = &config.pagination;

    Router::new()
        .route("/health", get(health::health))
        .merge(beers::routes(CrudState::new::<beers::Beer>(
            store.clone(),
            pages.beers,
        )))
        .merge(orders::routes(CrudState::new::<orders::Order>(
            store.clone(),
            pages.orders,
        )))
        .merge(stock::routes(CrudState::new::<stock::Stock>(
            store.clone(),
            pages.stock,
        )))
        .merge(users::routes(CrudState::new::<users::User>(
            store.clone(),
            pages.users,
        )))
        .merge(migrations::routes(store))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(
            host.parse()
                .with_context(|| format!("Invalid server host: {}", host))?,
            port,
        );

        let store: Arc<dyn EntityStore> = app.database.clone();
        let service = router(store, &app.config);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(address = %addr, "Listening");

        axum::serve(listener, service)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
