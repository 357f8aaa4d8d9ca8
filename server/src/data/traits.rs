//! Repository traits for the persistence layer
//!
//! Handlers talk to storage only through [`EntityStore`], so the PostgreSQL
//! service and the in-memory test store are interchangeable.

use async_trait::async_trait;
use serde::Serialize;

use crate::data::error::DataError;
use crate::domain::entity::{Predicate, Record, Table};

/// Row of the `schema_migrations` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRow {
    pub version: i32,
    pub name: String,
    /// Unix timestamp (seconds)
    pub applied_at: i64,
    pub checksum: String,
    pub execution_time_ms: Option<i32>,
}

/// Generic row storage keyed by table descriptors
///
/// Records returned by every method contain readable columns only.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Rows matching all predicates, after skipping `skip` and taking at most `limit`
    async fn list(
        &self,
        table: &Table,
        predicates: &[Predicate],
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Record>, DataError>;

    async fn get(&self, table: &Table, id: i64) -> Result<Option<Record>, DataError>;

    /// Insert a row and return it with its generated id
    async fn create(&self, table: &Table, values: Record) -> Result<Record, DataError>;

    /// Overwrite the given columns; `None` when the row does not exist
    async fn update(
        &self,
        table: &Table,
        id: i64,
        values: Record,
    ) -> Result<Option<Record>, DataError>;

    /// Returns whether a row was deleted
    async fn delete(&self, table: &Table, id: i64) -> Result<bool, DataError>;

    /// Most recently applied schema migration
    async fn last_migration(&self) -> Result<Option<MigrationRow>, DataError>;
}
