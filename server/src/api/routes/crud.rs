//! Generic CRUD handlers
//!
//! One set of list/get/create/update/delete handlers, instantiated per
//! [`Entity`]. The list handler turns the raw query string into predicates
//! on the entity's columns; writes go through the entity's request bodies.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::{ApiError, ListResponse};
use crate::core::constants::MAX_PAGE_LIMIT;
use crate::data::EntityStore;
use crate::domain::entity::{Entity, Record};
use crate::domain::filters::parse_query_filters;

/// Shared state for one entity's routes
#[derive(Clone)]
pub struct CrudState {
    pub store: Arc<dyn EntityStore>,
    pub page_limit: u32,
}

impl CrudState {
    /// State for `E`, falling back to the entity's default page size
    pub fn new<E: Entity>(store: Arc<dyn EntityStore>, page_limit: Option<u32>) -> Self {
        Self {
            store,
            page_limit: page_limit.unwrap_or(E::DEFAULT_PAGE_LIMIT),
        }
    }
}

/// Pagination parameters; every other key is read as a filter
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

/// Mount the CRUD handlers for `E` under `prefix`
///
/// The collection route answers with and without a trailing slash.
pub fn routes<E: Entity>(prefix: &str, state: CrudState) -> Router<()> {
    Router::new()
        .route(prefix, get(list::<E>).post(create::<E>))
        .route(&format!("{}/", prefix), get(list::<E>).post(create::<E>))
        .route(
            &format!("{}/{{id}}", prefix),
            get(get_one::<E>).put(update::<E>).delete(delete::<E>),
        )
        .with_state(state)
}

fn not_found<E: Entity>() -> ApiError {
    ApiError::not_found(
        format!("{}_NOT_FOUND", E::NAME.to_uppercase()),
        format!("{} not found", E::NAME),
    )
}

/// Read a stored row back into the entity's response shape
fn decode<E: Entity>(record: Record) -> Result<E, ApiError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        tracing::error!(entity = E::NAME, error = %e, "Stored row does not match entity");
        ApiError::internal("Internal Error")
    })
}

/// List rows matching the query string filters
pub async fn list<E: Entity>(
    State(state): State<CrudState>,
    RawQuery(raw): RawQuery,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse<E>>, ApiError> {
    let Query(params) = params?;
    let filters = parse_query_filters(raw.as_deref().unwrap_or_default())?;
    let predicates = E::TABLE.predicates(filters)?;
    let limit = params.limit.unwrap_or(state.page_limit).min(MAX_PAGE_LIMIT);

    let rows = state
        .store
        .list(&E::TABLE, &predicates, params.skip, limit)
        .await
        .map_err(ApiError::from_data)?;

    let results = rows
        .into_iter()
        .map(decode::<E>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ListResponse::new(results)))
}

pub async fn get_one<E: Entity>(
    State(state): State<CrudState>,
    IdPath(id): IdPath,
) -> Result<Json<E>, ApiError> {
    let row = state
        .store
        .get(&E::TABLE, id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(not_found::<E>)?;
    Ok(Json(decode(row)?))
}

pub async fn create<E: Entity>(
    State(state): State<CrudState>,
    ValidatedJson(body): ValidatedJson<E::Create>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let values = E::create_record(body)?;
    let row = state
        .store
        .create(&E::TABLE, values)
        .await
        .map_err(ApiError::from_data)?;
    tracing::debug!(entity = E::NAME, "Created row");
    Ok((StatusCode::CREATED, Json(decode(row)?)))
}

/// Partial update; fields absent or null in the body keep their value
pub async fn update<E: Entity>(
    State(state): State<CrudState>,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<E::Update>,
) -> Result<Json<E>, ApiError> {
    let values = E::update_record(body)?;
    let row = if values.is_empty() {
        state.store.get(&E::TABLE, id).await
    } else {
        state.store.update(&E::TABLE, id, values).await
    }
    .map_err(ApiError::from_data)?
    .ok_or_else(not_found::<E>)?;
    Ok(Json(decode(row)?))
}

pub async fn delete<E: Entity>(
    State(state): State<CrudState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .store
        .delete(&E::TABLE, id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(not_found::<E>());
    }
    tracing::debug!(entity = E::NAME, id, "Deleted row");
    Ok(StatusCode::NO_CONTENT)
}
