//! Shared API types
//!
//! Common types used across all API endpoints including error handling
//! and list responses.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::data::DataError;
use crate::domain::constraints::classify;
use crate::domain::entity::{PredicateError, RecordError};
use crate::domain::filters::FilterError;
use crate::utils::string::truncate;

/// Longest database message written to the error log
const MAX_LOGGED_ERROR_LEN: usize = 2048;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a store failure to a client message or an opaque 500
    pub fn from_data(e: DataError) -> Self {
        let text = e.database_message();
        let classified = classify(&text);
        if classified.is_client_error() {
            tracing::debug!(message = %classified.message, "Constraint violation");
            return Self::bad_request("CONSTRAINT_VIOLATION", classified.message);
        }
        tracing::error!(error = %truncate(&text, MAX_LOGGED_ERROR_LEN), "Data error");
        Self::internal(classified.message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        let code = match e {
            FilterError::UnsupportedOperator(_) => "UNSUPPORTED_OPERATOR",
            FilterError::MalformedFilter(_) => "MALFORMED_FILTER",
        };
        Self::bad_request(code, e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("QUERY_PARSE_ERROR", rejection.body_text())
    }
}

impl From<PredicateError> for ApiError {
    fn from(e: PredicateError) -> Self {
        Self::bad_request("INVALID_FILTER_VALUE", e.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        tracing::error!(error = %e, "Failed to prepare row values");
        Self::internal("Internal Error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, code, message) = match self {
            Self::BadRequest { code, message } => ("bad_request", code, message),
            Self::NotFound { code, message } => ("not_found", code, message),
            Self::Internal { message } => ("internal_error", "INTERNAL".to_string(), message),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// List endpoint response; `count` is the number of rows in `results`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}
