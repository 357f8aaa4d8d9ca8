//! Data storage layer
//!
//! - `postgres` - PostgreSQL pool, schema, migrations and the SQL store
//! - `traits` - The `EntityStore` trait the API is written against
//! - `error` - Unified error type for the layer

pub mod error;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::DataError;
pub use postgres::PostgresService;
pub use traits::{EntityStore, MigrationRow};
