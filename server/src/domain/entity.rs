//! Entity descriptors
//!
//! Each resource served by the CRUD layer implements [`Entity`]: a table
//! descriptor (name, id column, typed columns) plus the request bodies used
//! to create and update rows. Column metadata doubles as the filter
//! whitelist and drives value validation before anything reaches SQL.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use super::filters::{Filter, FilterOp};
use crate::core::constants::DEFAULT_PAGE_LIMIT;

/// A row or partial row keyed by column name
pub type Record = Map<String, Value>;

/// Column storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Integer,
    Numeric,
    Text,
    Date,
    Timestamp,
}

impl ColumnKind {
    /// PostgreSQL type used when casting bound text parameters
    pub const fn sql_type(&self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Integer => "INTEGER",
            Self::Numeric => "NUMERIC",
            Self::Text => "TEXT",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMPTZ",
        }
    }

    /// Check that a textual value can be cast to this kind
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::BigInt => value.parse::<i64>().is_ok(),
            Self::Integer => value.parse::<i32>().is_ok(),
            Self::Numeric => value.parse::<f64>().is_ok_and(f64::is_finite),
            Self::Text => true,
            Self::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::Timestamp => {
                chrono::DateTime::parse_from_rfc3339(value).is_ok()
                    || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
                    || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
                    || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Write-only columns are never selected or filtered on
    pub readable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            readable: true,
        }
    }

    pub const fn write_only(self) -> Self {
        Self {
            readable: false,
            ..self
        }
    }
}

/// Table descriptor
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn readable_columns(&self) -> impl Iterator<Item = &'static Column> + '_ {
        self.columns.iter().filter(|c| c.readable)
    }

    /// Turn parsed filters into predicates on readable columns
    ///
    /// Filters naming an unknown or write-only column are dropped. A value
    /// the column type cannot hold is an error.
    pub fn predicates(&self, filters: Vec<Filter>) -> Result<Vec<Predicate>, PredicateError> {
        let mut predicates = Vec::with_capacity(filters.len());
        for filter in filters {
            let Some(column) = self.column(&filter.field).filter(|c| c.readable) else {
                tracing::trace!(table = self.name, field = %filter.field, "Ignoring unknown filter field");
                continue;
            };
            if !column.kind.accepts(&filter.value) {
                return Err(PredicateError::InvalidValue {
                    field: filter.field,
                    value: filter.value,
                });
            }
            predicates.push(Predicate {
                column,
                op: filter.op,
                value: filter.value,
            });
        }
        Ok(predicates)
    }
}

/// A filter bound to a known column
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: &'static Column,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// A request body that could not be turned into column values
#[derive(Error, Debug)]
#[error("Cannot prepare {entity} values: {reason}")]
pub struct RecordError {
    pub entity: &'static str,
    pub reason: String,
}

/// A resource exposed through the generic CRUD handlers
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Create: DeserializeOwned + Serialize + Validate + Send + 'static;
    type Update: DeserializeOwned + Serialize + Validate + Send + 'static;

    /// Singular display name used in messages ("Beer not found")
    const NAME: &'static str;
    const TABLE: Table;
    const DEFAULT_PAGE_LIMIT: u32 = DEFAULT_PAGE_LIMIT;

    /// Column values to insert
    fn create_record(body: Self::Create) -> Result<Record, RecordError> {
        Ok(to_record(&body))
    }

    /// Column values to overwrite; absent and null fields are left alone
    fn update_record(body: Self::Update) -> Result<Record, RecordError> {
        Ok(to_partial_record(&body))
    }
}

/// Serialize a struct into a column map
pub fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

/// Like [`to_record`], without null fields
pub fn to_partial_record<T: Serialize>(value: &T) -> Record {
    let mut record = to_record(value);
    record.retain(|_, v| !v.is_null());
    record
}
