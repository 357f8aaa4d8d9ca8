//! Stock API endpoints

pub mod types;

use axum::Router;

use super::crud::{self, CrudState};
use crate::domain::entity::{Column, ColumnKind, Entity, Table};

pub use types::{CreateStockRequest, Stock, UpdateStockRequest};

impl Entity for Stock {
    type Create = CreateStockRequest;
    type Update = UpdateStockRequest;

    const NAME: &'static str = "Stock";
    const TABLE: Table = Table {
        name: "stock",
        id_column: "id",
        columns: &[
            Column::new("id", ColumnKind::BigInt),
            Column::new("beer_id", ColumnKind::BigInt),
            Column::new("date_of_arrival", ColumnKind::Date),
            Column::new("qty_in_stock", ColumnKind::Integer),
        ],
    };
}

/// Build Stock API routes
pub fn routes(state: CrudState) -> Router<()> {
    crud::routes::<Stock>("/stock", state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::api::routes::crud::test_support::send;
    use crate::data::memory::MemoryStore;

    async fn seeded() -> Router {
        let store = Arc::new(MemoryStore::new().with_unique("stock", "beer_id"));
        let app = routes(CrudState::new::<Stock>(store, None));
        for (beer_id, date, qty) in [(1, "2024-01-10", 40), (2, "2024-02-01", 0), (3, "2024-02-15", 12)] {
            let body = json!({"beer_id": beer_id, "date_of_arrival": date, "qty_in_stock": qty});
            let (status, _) = send(&app, Method::POST, "/stock/", Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        app
    }

    #[tokio::test]
    async fn test_second_row_for_beer_rejected() {
        let app = seeded().await;
        let body = json!({"beer_id": 1, "date_of_arrival": "2024-03-01", "qty_in_stock": 5});
        let (status, err) = send(&app, Method::POST, "/stock/", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "The Beer_id: 1 already exists");
    }

    #[tokio::test]
    async fn test_moving_stock_onto_taken_beer_rejected() {
        let app = seeded().await;
        let (status, err) = send(&app, Method::PUT, "/stock/2", Some(json!({"beer_id": 3}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "The Beer_id: 3 already exists");

        let (status, body) = send(&app, Method::PUT, "/stock/2", Some(json!({"beer_id": 2}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["beer_id"], 2);
    }

    #[tokio::test]
    async fn test_filter_by_arrival_date() {
        let app = seeded().await;
        let (status, body) =
            send(&app, Method::GET, "/stock/?date_of_arrival[ge]=2024-02-01", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        let (_, body) = send(&app, Method::GET, "/stock?qty_in_stock=0", None).await;
        assert_eq!(body["results"][0]["beer_id"], 2);
    }

    #[tokio::test]
    async fn test_invalid_date_filter() {
        let app = seeded().await;
        let (status, err) =
            send(&app, Method::GET, "/stock/?date_of_arrival=2024-13-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_FILTER_VALUE");
    }

    #[tokio::test]
    async fn test_get_stock() {
        let app = seeded().await;
        let (status, body) = send(&app, Method::GET, "/stock/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date_of_arrival"], "2024-02-15");
        assert_eq!(body["qty_in_stock"], 12);

        let (status, err) = send(&app, Method::GET, "/stock/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["message"], "Stock not found");
    }
}
