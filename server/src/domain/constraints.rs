//! Constraint violation classification
//!
//! Database drivers report constraint failures as text. This module
//! recognises the conventional PostgreSQL phrasing and turns it into a
//! user-facing status and message. Recognition order matters: the first
//! matching kind wins.

use std::fmt;

use crate::utils::string::capitalize;

/// Status and message to send back to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub status_code: u16,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(500, "Internal Error")
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }
}

/// Named check constraints with a dedicated message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckConstraint {
    BeerAbv,
    BeerPrice,
    Other,
}

/// Structured form of a constraint failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    NotNull { relation: String, column: String },
    Unique { field: String, value: String },
    Check(CheckConstraint),
    ForeignKey { subject: &'static str, id: String },
    Unknown,
}

impl ConstraintViolation {
    /// Recognise a violation from error text
    ///
    /// Text that names a known kind but lacks the expected quoted or
    /// parenthesised segments is `Unknown`.
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("not-null constraint") {
            return Self::not_null(text).unwrap_or(Self::Unknown);
        }
        if lower.contains("unique constraint") {
            return Self::unique(text).unwrap_or(Self::Unknown);
        }
        if lower.contains("check constraint") {
            let check = if text.contains("beers_abv") {
                CheckConstraint::BeerAbv
            } else if text.contains("beers_price") {
                CheckConstraint::BeerPrice
            } else {
                CheckConstraint::Other
            };
            return Self::Check(check);
        }
        if lower.contains("foreign key constraint") {
            return Self::foreign_key(text).unwrap_or(Self::Unknown);
        }

        Self::Unknown
    }

    fn not_null(text: &str) -> Option<Self> {
        let quoted: Vec<&str> = text.split('"').collect();
        let column = quoted.get(1)?;
        let relation = quoted.get(3)?;
        Some(Self::NotNull {
            relation: capitalize(relation),
            column: capitalize(column),
        })
    }

    fn unique(text: &str) -> Option<Self> {
        let mut groups = parenthesized(text);
        let field = groups.next()?;
        let value = groups.next()?;
        Some(Self::Unique {
            field: capitalize(field),
            value: value.to_string(),
        })
    }

    fn foreign_key(text: &str) -> Option<Self> {
        let subject = if text.contains("users") {
            "user"
        } else if text.contains("beers") {
            "beer"
        } else {
            "record"
        };
        let id = parenthesized(text).nth(1)?;
        Some(Self::ForeignKey {
            subject,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNull { relation, column } => write!(f, "{} must have a {}", relation, column),
            Self::Unique { field, value } => write!(f, "The {}: {} already exists", field, value),
            Self::Check(CheckConstraint::BeerAbv) => f.write_str("A beer ABV cannot be negative"),
            Self::Check(CheckConstraint::BeerPrice) => {
                f.write_str("A beer price cannot be negative")
            }
            Self::Check(CheckConstraint::Other) => f.write_str("Check constraint violation"),
            Self::ForeignKey { subject, id } => write!(f, "No {} with id {} found", subject, id),
            Self::Unknown => f.write_str("Internal Error"),
        }
    }
}

impl From<ConstraintViolation> for ClassifiedError {
    fn from(violation: ConstraintViolation) -> Self {
        match violation {
            ConstraintViolation::Unknown => Self::internal(),
            known => Self::new(400, known.to_string()),
        }
    }
}

/// Classify error text into a status and message
pub fn classify(text: &str) -> ClassifiedError {
    ConstraintViolation::parse(text).into()
}

/// Contents of each `(...)` group, in order
fn parenthesized(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let open = rest.find('(')?;
        let after = &rest[open + 1..];
        let close = after.find(')')?;
        rest = &after[close + 1..];
        Some(&after[..close])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_null_constraint_error() {
        let text = r#"column "name" of relation "User" violates not-null constraint"#;
        assert_eq!(classify(text), ClassifiedError::new(400, "User must have a Name"));
    }

    #[test]
    fn not_null_postgres_phrasing() {
        let text = r#"null value in column "abv" of relation "beers" violates not-null constraint
DETAIL:  Failing row contains (3, Lager, null, null, 2.50)."#;
        assert_eq!(classify(text), ClassifiedError::new(400, "Beers must have a Abv"));
    }

    #[test]
    fn not_null_missing_quotes_falls_back() {
        assert_eq!(
            classify("violates not-null constraint"),
            ClassifiedError::internal()
        );
        assert_eq!(
            classify(r#"column "name" violates not-null constraint"#),
            ClassifiedError::internal()
        );
    }

    #[test]
    fn unique_constraint_error() {
        let text = r#"duplicate key value violates unique constraint "user_email_key" (email)=(john@example.com) already exists"#;
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "The Email: john@example.com already exists")
        );
    }

    #[test]
    fn unique_postgres_detail() {
        let text = "duplicate key value violates unique constraint \"stock_beer_id_key\"\nDETAIL:  Key (beer_id)=(7) already exists.";
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "The Beer_id: 7 already exists")
        );
    }

    #[test]
    fn unique_without_groups_falls_back() {
        assert_eq!(
            classify(r#"duplicate key value violates unique constraint "users_email_key""#),
            ClassifiedError::internal()
        );
    }

    #[test]
    fn check_constraint_abv() {
        let text = r#"new row for relation "beers" violates check constraint "beers_abv_check""#;
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "A beer ABV cannot be negative")
        );
    }

    #[test]
    fn check_constraint_price() {
        let text = r#"new row for relation "beers" violates check constraint "beers_price_check""#;
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "A beer price cannot be negative")
        );
    }

    #[test]
    fn check_constraint_generic() {
        let text = r#"new row for relation "orders" violates check constraint "orders_qty_check""#;
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "Check constraint violation")
        );
    }

    #[test]
    fn foreign_key_user() {
        let text = "insert or update on table \"orders\" violates foreign key constraint \"orders_user_id_fkey\"\nDETAIL:  Key (user_id)=(42) is not present in table \"users\".";
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "No user with id 42 found")
        );
    }

    #[test]
    fn foreign_key_beer() {
        let text = "insert or update on table \"stock\" violates foreign key constraint \"stock_beer_id_fkey\"\nDETAIL:  Key (beer_id)=(9) is not present in table \"beers\".";
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "No beer with id 9 found")
        );
    }

    #[test]
    fn foreign_key_unknown_table() {
        let text = "violates foreign key constraint \"x_fkey\" Key (thing_id)=(3)";
        assert_eq!(
            classify(text),
            ClassifiedError::new(400, "No record with id 3 found")
        );
    }

    #[test]
    fn foreign_key_without_id_falls_back() {
        assert_eq!(
            classify("violates foreign key constraint on users"),
            ClassifiedError::internal()
        );
    }

    #[test]
    fn generic_error() {
        assert_eq!(classify("some random error"), ClassifiedError::internal());
        assert_eq!(classify(""), ClassifiedError::internal());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let text = r#"column "name" of relation "beers" violates NOT-NULL CONSTRAINT"#;
        assert_eq!(classify(text).status_code, 400);
    }

    #[test]
    fn not_null_takes_precedence_over_check() {
        let text = r#"column "abv" of relation "beers" violates not-null constraint; check constraint "beers_abv_check""#;
        assert_eq!(classify(text), ClassifiedError::new(400, "Beers must have a Abv"));
    }

    #[test]
    fn unique_takes_precedence_over_foreign_key() {
        let text = "unique constraint and foreign key constraint (beer_id)=(1)";
        assert_eq!(
            ConstraintViolation::parse(text),
            ConstraintViolation::Unique {
                field: "Beer_id".to_string(),
                value: "1".to_string()
            }
        );
    }

    #[test]
    fn parenthesized_groups_in_order() {
        let groups: Vec<&str> = parenthesized("Key (a)=(b) and (c").collect();
        assert_eq!(groups, vec!["a", "b"]);
    }

    #[test]
    fn client_error_flag() {
        assert!(classify("check constraint").is_client_error());
        assert!(!ClassifiedError::internal().is_client_error());
    }
}
