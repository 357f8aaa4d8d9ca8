//! In-memory EntityStore for handler tests
//!
//! Rows are kept per table in id order. Unique columns are enforced and
//! report PostgreSQL-style error text so classification can be exercised
//! without a database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::data::error::DataError;
use crate::data::traits::{EntityStore, MigrationRow};
use crate::domain::entity::{ColumnKind, Predicate, Record, Table};

#[derive(Default)]
struct TableRows {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, TableRows>>,
    unique: Vec<(&'static str, &'static str)>,
    migrations: Vec<MigrationRow>,
    fail_next_write: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of `column` in `table`
    pub fn with_unique(mut self, table: &'static str, column: &'static str) -> Self {
        self.unique.push((table, column));
        self
    }

    pub fn with_migration(mut self, migration: MigrationRow) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Make the next create or update fail with the given database text
    pub async fn fail_next_write(&self, text: impl Into<String>) {
        *self.fail_next_write.lock().await = Some(text.into());
    }

    /// Stored row including write-only columns
    pub async fn raw_row(&self, table: &str, id: i64) -> Option<Record> {
        let tables = self.tables.lock().await;
        tables.get(table)?.rows.get(&id).cloned()
    }

    async fn take_failure(&self) -> Result<(), DataError> {
        match self.fail_next_write.lock().await.take() {
            Some(text) => Err(DataError::Constraint(text)),
            None => Ok(()),
        }
    }

    fn check_unique(
        &self,
        table: &Table,
        rows: &TableRows,
        values: &Record,
        skip_id: Option<i64>,
    ) -> Result<(), DataError> {
        for (_, column) in self.unique.iter().filter(|(t, _)| *t == table.name) {
            let Some(value) = values.get(*column).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = rows
                .rows
                .iter()
                .filter(|(id, _)| Some(**id) != skip_id)
                .any(|(_, row)| row.get(*column) == Some(value));
            if taken {
                return Err(DataError::Constraint(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"\nDETAIL:  Key ({})=({}) already exists.",
                    table.name,
                    column,
                    column,
                    text_of(value)
                )));
            }
        }
        Ok(())
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(kind: ColumnKind, stored: &Value, wanted: &str) -> Option<Ordering> {
    if stored.is_null() {
        return None;
    }
    let stored = text_of(stored);
    match kind {
        ColumnKind::BigInt | ColumnKind::Integer | ColumnKind::Numeric => {
            let a: f64 = stored.trim().parse().ok()?;
            let b: f64 = wanted.trim().parse().ok()?;
            a.partial_cmp(&b)
        }
        ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp => {
            Some(stored.as_str().cmp(wanted))
        }
    }
}

fn matches_all(row: &Record, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| {
        row.get(p.column.name)
            .and_then(|v| compare(p.column.kind, v, &p.value))
            .is_some_and(|ordering| p.op.matches(ordering))
    })
}

fn readable(table: &Table, row: &Record) -> Record {
    table
        .readable_columns()
        .filter_map(|c| row.get(c.name).map(|v| (c.name.to_string(), v.clone())))
        .collect()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(
        &self,
        table: &Table,
        predicates: &[Predicate],
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Record>, DataError> {
        let tables = self.tables.lock().await;
        let Some(rows) = tables.get(table.name) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .rows
            .values()
            .filter(|row| matches_all(row, predicates))
            .skip(skip as usize)
            .take(limit as usize)
            .map(|row| readable(table, row))
            .collect())
    }

    async fn get(&self, table: &Table, id: i64) -> Result<Option<Record>, DataError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .get(table.name)
            .and_then(|rows| rows.rows.get(&id))
            .map(|row| readable(table, row)))
    }

    async fn create(&self, table: &Table, values: Record) -> Result<Record, DataError> {
        self.take_failure().await?;
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table.name).or_default();
        self.check_unique(table, rows, &values, None)?;

        rows.next_id += 1;
        let id = rows.next_id;
        let mut row = Record::new();
        row.insert(table.id_column.to_string(), Value::from(id));
        for (key, value) in values {
            if table.column(&key).is_some() {
                row.insert(key, value);
            }
        }
        let created = readable(table, &row);
        rows.rows.insert(id, row);
        Ok(created)
    }

    async fn update(
        &self,
        table: &Table,
        id: i64,
        values: Record,
    ) -> Result<Option<Record>, DataError> {
        self.take_failure().await?;
        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(table.name) else {
            return Ok(None);
        };
        if !rows.rows.contains_key(&id) {
            return Ok(None);
        }
        self.check_unique(table, rows, &values, Some(id))?;

        let Some(row) = rows.rows.get_mut(&id) else {
            return Ok(None);
        };
        for (key, value) in values {
            if table.column(&key).is_some() {
                row.insert(key, value);
            }
        }
        Ok(Some(readable(table, row)))
    }

    async fn delete(&self, table: &Table, id: i64) -> Result<bool, DataError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .get_mut(table.name)
            .is_some_and(|rows| rows.rows.remove(&id).is_some()))
    }

    async fn last_migration(&self) -> Result<Option<MigrationRow>, DataError> {
        Ok(self.migrations.iter().max_by_key(|m| m.version).cloned())
    }
}
