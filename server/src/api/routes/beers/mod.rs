//! Beer API endpoints

pub mod types;

use axum::Router;

use super::crud::{self, CrudState};
use crate::domain::entity::{Column, ColumnKind, Entity, Table};

pub use types::{Beer, CreateBeerRequest, UpdateBeerRequest};

impl Entity for Beer {
    type Create = CreateBeerRequest;
    type Update = UpdateBeerRequest;

    const NAME: &'static str = "Beer";
    const TABLE: Table = Table {
        name: "beers",
        id_column: "id",
        columns: &[
            Column::new("id", ColumnKind::BigInt),
            Column::new("name", ColumnKind::Text),
            Column::new("style", ColumnKind::Text),
            Column::new("abv", ColumnKind::Numeric),
            Column::new("price", ColumnKind::Numeric),
        ],
    };
}

/// Build Beer API routes
pub fn routes(state: CrudState) -> Router<()> {
    crud::routes::<Beer>("/beers", state)
}
