//! User API types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User DTO for API responses; the password never leaves the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Request body for registering a user
#[derive(Deserialize, Serialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 60, message = "Email must be 1-60 characters"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[validate(length(max = 60, message = "Address must be at most 60 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 12, message = "Phone must be at most 12 characters"))]
    pub phone: Option<String>,
}

/// Request body for updating a user
#[derive(Deserialize, Serialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 60, message = "Email must be 1-60 characters"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
    #[validate(length(max = 60, message = "Address must be at most 60 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 12, message = "Phone must be at most 12 characters"))]
    pub phone: Option<String>,
}
