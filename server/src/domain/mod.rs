//! Domain logic for the inventory service
//!
//! - `constraints` - Database constraint failures to client messages
//! - `entity` - Entity trait and table descriptors
//! - `filters` - Query string filter parsing

pub mod constraints;
pub mod entity;
pub mod filters;

pub use constraints::{ClassifiedError, ConstraintViolation, classify};
pub use entity::{
    Column, ColumnKind, Entity, Predicate, PredicateError, Record, RecordError, Table,
};
pub use filters::{Filter, FilterError, FilterOp, parse_query_filters};
