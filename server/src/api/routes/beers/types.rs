//! Beer API types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Beer DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: i64,
    pub name: String,
    pub style: Option<String>,
    pub abv: f64,
    pub price: f64,
}

/// Request body for creating a beer
///
/// Negative ABV and non-positive prices are rejected by the database check
/// constraints, not here.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateBeerRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "Style must be at most 50 characters"))]
    pub style: Option<String>,
    #[validate(range(max = 99.9, message = "ABV must be at most 99.9"))]
    pub abv: f64,
    #[validate(range(max = 9999.99, message = "Price must be at most 9999.99"))]
    pub price: f64,
}

/// Request body for updating a beer
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateBeerRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "Style must be at most 50 characters"))]
    pub style: Option<String>,
    #[validate(range(max = 99.9, message = "ABV must be at most 99.9"))]
    pub abv: Option<f64>,
    #[validate(range(max = 9999.99, message = "Price must be at most 9999.99"))]
    pub price: Option<f64>,
}
