//! Stock API types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stock DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub beer_id: i64,
    pub date_of_arrival: NaiveDate,
    pub qty_in_stock: i32,
}

/// Request body for recording stock; one row per beer
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateStockRequest {
    pub beer_id: i64,
    pub date_of_arrival: NaiveDate,
    #[validate(range(min = 0, message = "Quantity in stock cannot be negative"))]
    pub qty_in_stock: i32,
}

/// Request body for updating stock
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateStockRequest {
    pub beer_id: Option<i64>,
    pub date_of_arrival: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Quantity in stock cannot be negative"))]
    pub qty_in_stock: Option<i32>,
}
