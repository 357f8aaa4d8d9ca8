//! Migration status endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::data::{EntityStore, MigrationRow};

/// Build migration status routes
pub fn routes(store: Arc<dyn EntityStore>) -> Router<()> {
    Router::new()
        .route("/migrator/last", get(last_migration))
        .with_state(store)
}

/// Most recently applied migration
pub async fn last_migration(
    State(store): State<Arc<dyn EntityStore>>,
) -> Result<Json<MigrationRow>, ApiError> {
    store
        .last_migration()
        .await
        .map_err(ApiError::from_data)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("MIGRATION_NOT_FOUND", "No migrations applied"))
}
