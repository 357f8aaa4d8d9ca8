//! Query filter system
//!
//! Parses `field[op]=value` query strings into ordered comparison filters.
//!
//! ## Usage
//!
//! ```
//! use beerpy_server::domain::filters::{FilterOp, parse_query_filters};
//!
//! let filters = parse_query_filters("style=IPA&abv[gt]=5").unwrap();
//! assert_eq!(filters.len(), 2);
//! assert_eq!(filters[1].op, FilterOp::Gt);
//! ```

mod parser;
mod types;

pub use parser::{CONTROL_KEYS, parse_query_filters};
pub use types::{Filter, FilterError, FilterOp};
