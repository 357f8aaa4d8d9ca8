//! Order API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub beer_id: i64,
    pub user_id: i64,
    pub qty: i32,
    pub ordered_at: DateTime<Utc>,
    pub price_paid: f64,
}

/// Request body for placing an order
///
/// Unknown beer or user ids are reported by the foreign keys.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateOrderRequest {
    pub beer_id: i64,
    pub user_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub qty: i32,
    pub ordered_at: DateTime<Utc>,
    #[validate(range(min = 0.0, max = 999999.99, message = "Price paid must be 0-999999.99"))]
    pub price_paid: f64,
}

/// Request body for updating an order
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateOrderRequest {
    pub beer_id: Option<i64>,
    pub user_id: Option<i64>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub qty: Option<i32>,
    pub ordered_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 999999.99, message = "Price paid must be 0-999999.99"))]
    pub price_paid: Option<f64>,
}
