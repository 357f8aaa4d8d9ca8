//! API route handlers

pub mod beers;
pub mod crud;
pub mod health;
pub mod migrations;
pub mod orders;
pub mod stock;
pub mod users;
