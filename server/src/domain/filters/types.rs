//! Filter type definitions
//!
//! A filter is a single `field <op> value` comparison taken from a request's
//! query string. Values stay as strings; typing happens against the column.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Comparison operators accepted in `field[op]=value` query keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterOp {
    Lt,
    Le,
    #[default]
    Eq,
    Ge,
    Gt,
}

impl FilterOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ge => "ge",
            Self::Gt => "gt",
        }
    }

    /// SQL comparison operator
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    /// Apply the operator to an already-ordered pair
    pub fn matches(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Self::Lt => ordering == Less,
            Self::Le => ordering != Greater,
            Self::Eq => ordering == Equal,
            Self::Ge => ordering != Less,
            Self::Gt => ordering == Greater,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lt" => Ok(Self::Lt),
            "le" => Ok(Self::Le),
            "eq" => Ok(Self::Eq),
            "ge" => Ok(Self::Ge),
            "gt" => Ok(Self::Gt),
            other => Err(FilterError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// One comparison extracted from a query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Query string could not be turned into filters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),
}
