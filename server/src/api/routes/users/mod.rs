//! User API endpoints

pub mod types;

use axum::Router;
use serde_json::Value;

use super::crud::{self, CrudState};
use crate::domain::entity::{
    Column, ColumnKind, Entity, Record, RecordError, Table, to_partial_record, to_record,
};
use crate::utils::crypto::hash_password;

pub use types::{CreateUserRequest, UpdateUserRequest, User};

impl Entity for User {
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    const NAME: &'static str = "User";
    const TABLE: Table = Table {
        name: "users",
        id_column: "id",
        columns: &[
            Column::new("id", ColumnKind::BigInt),
            Column::new("name", ColumnKind::Text),
            Column::new("email", ColumnKind::Text),
            Column::new("password", ColumnKind::Text).write_only(),
            Column::new("address", ColumnKind::Text),
            Column::new("phone", ColumnKind::Text),
        ],
    };

    fn create_record(body: CreateUserRequest) -> Result<Record, RecordError> {
        let mut record = to_record(&body);
        record.insert("password".into(), hashed(&body.password)?);
        Ok(record)
    }

    fn update_record(body: UpdateUserRequest) -> Result<Record, RecordError> {
        let mut record = to_partial_record(&body);
        if let Some(password) = &body.password {
            record.insert("password".into(), hashed(password)?);
        }
        Ok(record)
    }
}

fn hashed(password: &str) -> Result<Value, RecordError> {
    hash_password(password)
        .map(Value::from)
        .map_err(|e| RecordError {
            entity: User::NAME,
            reason: e.to_string(),
        })
}

/// Build User API routes
pub fn routes(state: CrudState) -> Router<()> {
    crud::routes::<User>("/users", state)
}
