//! Order API endpoints

pub mod types;

use axum::Router;

use super::crud::{self, CrudState};
use crate::domain::entity::{Column, ColumnKind, Entity, Table};

pub use types::{CreateOrderRequest, Order, UpdateOrderRequest};

impl Entity for Order {
    type Create = CreateOrderRequest;
    type Update = UpdateOrderRequest;

    const NAME: &'static str = "Order";
    const TABLE: Table = Table {
        name: "orders",
        id_column: "id",
        columns: &[
            Column::new("id", ColumnKind::BigInt),
            Column::new("beer_id", ColumnKind::BigInt),
            Column::new("user_id", ColumnKind::BigInt),
            Column::new("qty", ColumnKind::Integer),
            Column::new("ordered_at", ColumnKind::Timestamp),
            Column::new("price_paid", ColumnKind::Numeric),
        ],
    };
}

/// Build Order API routes
pub fn routes(state: CrudState) -> Router<()> {
    crud::routes::<Order>("/orders", state)
}
