//! EntityStore implementation for PostgreSQL
//!
//! SQL is generated from table descriptors. Identifiers come from static
//! column lists; every value is bound as text and cast to the column type,
//! and rows come back as JSON objects via `to_jsonb`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use super::PostgresService;
use crate::data::error::DataError;
use crate::data::traits::{EntityStore, MigrationRow};
use crate::domain::entity::{Column, Predicate, Record, Table};

/// Comma-separated readable column names
fn select_list(table: &Table) -> String {
    table
        .readable_columns()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text form of a JSON value for a `$n::TYPE` bind
fn bind_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Pair record values with their columns, dropping unknown keys
fn known_values<'a>(table: &Table, values: &'a Record) -> Vec<(&'static Column, &'a Value)> {
    values
        .iter()
        .filter_map(|(key, value)| table.column(key).map(|c| (c, value)))
        .collect()
}

fn into_record(row: Json<Value>) -> Record {
    match row.0 {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Wrap a statement that returns `*` so only readable columns come back
fn push_returning_json(qb: &mut QueryBuilder<'_, Postgres>, table: &Table) {
    qb.push(" RETURNING *) SELECT to_jsonb(t) FROM (SELECT ");
    qb.push(select_list(table));
    qb.push(" FROM written) AS t");
}

pub(crate) fn build_list_query<'a>(
    table: &Table,
    predicates: &'a [Predicate],
    skip: u32,
    limit: u32,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(t) FROM (SELECT ");
    qb.push(select_list(table));
    qb.push(" FROM ");
    qb.push(table.name);

    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(predicate.column.name);
        qb.push(" ");
        qb.push(predicate.op.sql());
        qb.push(" ");
        qb.push_bind(predicate.value.as_str());
        qb.push("::");
        qb.push(predicate.column.kind.sql_type());
    }

    qb.push(" LIMIT ");
    qb.push_bind(i64::from(limit));
    qb.push(" OFFSET ");
    qb.push_bind(i64::from(skip));
    qb.push(") AS t");
    qb
}

pub(crate) fn build_insert_query(table: &Table, values: &Record) -> QueryBuilder<'static, Postgres> {
    let entries = known_values(table, values);
    let mut qb = QueryBuilder::new("WITH written AS (INSERT INTO ");
    qb.push(table.name);

    if entries.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        qb.push(" (");
        let mut columns = qb.separated(", ");
        for (column, _) in &entries {
            columns.push(column.name);
        }
        qb.push(") VALUES (");
        let mut binds = qb.separated(", ");
        for (column, value) in &entries {
            binds.push_bind(bind_text(value));
            binds.push_unseparated("::");
            binds.push_unseparated(column.kind.sql_type());
        }
        qb.push(")");
    }

    push_returning_json(&mut qb, table);
    qb
}

/// `None` when no known column is being set
pub(crate) fn build_update_query(
    table: &Table,
    id: i64,
    values: &Record,
) -> Option<QueryBuilder<'static, Postgres>> {
    let entries = known_values(table, values);
    if entries.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("WITH written AS (UPDATE ");
    qb.push(table.name);
    qb.push(" SET ");
    let mut assignments = qb.separated(", ");
    for (column, value) in &entries {
        assignments.push(column.name);
        assignments.push_unseparated(" = ");
        assignments.push_bind_unseparated(bind_text(value));
        assignments.push_unseparated("::");
        assignments.push_unseparated(column.kind.sql_type());
    }
    qb.push(" WHERE ");
    qb.push(table.id_column);
    qb.push(" = ");
    qb.push_bind(id);

    push_returning_json(&mut qb, table);
    Some(qb)
}

#[async_trait]
impl EntityStore for PostgresService {
    async fn list(
        &self,
        table: &Table,
        predicates: &[Predicate],
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Record>, DataError> {
        let mut qb = build_list_query(table, predicates, skip, limit);
        let rows: Vec<Json<Value>> = qb.build_query_scalar().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn get(&self, table: &Table, id: i64) -> Result<Option<Record>, DataError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT to_jsonb(t) FROM (SELECT ");
        qb.push(select_list(table));
        qb.push(" FROM ");
        qb.push(table.name);
        qb.push(" WHERE ");
        qb.push(table.id_column);
        qb.push(" = ");
        qb.push_bind(id);
        qb.push(") AS t");

        let row: Option<Json<Value>> = qb
            .build_query_scalar()
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(into_record))
    }

    async fn create(&self, table: &Table, values: Record) -> Result<Record, DataError> {
        let mut qb = build_insert_query(table, &values);
        let row: Json<Value> = qb.build_query_scalar().fetch_one(self.pool()).await?;
        Ok(into_record(row))
    }

    async fn update(
        &self,
        table: &Table,
        id: i64,
        values: Record,
    ) -> Result<Option<Record>, DataError> {
        let Some(mut qb) = build_update_query(table, id, &values) else {
            return self.get(table, id).await;
        };
        let row: Option<Json<Value>> = qb
            .build_query_scalar()
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(into_record))
    }

    async fn delete(&self, table: &Table, id: i64) -> Result<bool, DataError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(table.name);
        qb.push(" WHERE ");
        qb.push(table.id_column);
        qb.push(" = ");
        qb.push_bind(id);

        let result = qb.build().execute(self.pool()).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn last_migration(&self) -> Result<Option<MigrationRow>, DataError> {
        let row = sqlx::query_as::<_, (i32, String, i64, String, Option<i32>)>(
            "SELECT version, name, applied_at, checksum, execution_time_ms
             FROM schema_migrations
             WHERE success
             ORDER BY version DESC
             LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(
            |(version, name, applied_at, checksum, execution_time_ms)| MigrationRow {
                version,
                name,
                applied_at,
                checksum,
                execution_time_ms,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ColumnKind;
    use crate::domain::filters::FilterOp;

    const COLUMNS: &[Column] = &[
        Column::new("id", ColumnKind::BigInt),
        Column::new("name", ColumnKind::Text),
        Column::new("abv", ColumnKind::Numeric),
        Column::new("password", ColumnKind::Text).write_only(),
    ];

    const TABLE: Table = Table {
        name: "beers",
        id_column: "id",
        columns: COLUMNS,
    };

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_list_query_without_predicates() {
        let qb = build_list_query(&TABLE, &[], 0, 20);
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) FROM (SELECT id, name, abv FROM beers LIMIT $1 OFFSET $2) AS t"
        );
    }

    #[test]
    fn test_list_query_with_predicates() {
        let predicates = vec![
            Predicate {
                column: &COLUMNS[2],
                op: FilterOp::Ge,
                value: "3".into(),
            },
            Predicate {
                column: &COLUMNS[2],
                op: FilterOp::Lt,
                value: "7".into(),
            },
        ];
        let qb = build_list_query(&TABLE, &predicates, 5, 10);
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) FROM (SELECT id, name, abv FROM beers \
             WHERE abv >= $1::NUMERIC AND abv < $2::NUMERIC LIMIT $3 OFFSET $4) AS t"
        );
    }

    #[test]
    fn test_insert_query_casts_and_hides_write_only() {
        let values = record(&[
            ("name", Value::from("Hop")),
            ("abv", Value::from(4.5)),
            ("password", Value::from("digest")),
        ]);
        let qb = build_insert_query(&TABLE, &values);
        assert_eq!(
            qb.sql(),
            "WITH written AS (INSERT INTO beers (name, abv, password) \
             VALUES ($1::TEXT, $2::NUMERIC, $3::TEXT) RETURNING *) \
             SELECT to_jsonb(t) FROM (SELECT id, name, abv FROM written) AS t"
        );
    }

    #[test]
    fn test_insert_query_ignores_unknown_keys() {
        let values = record(&[("name", Value::from("Hop")), ("colour", Value::from("gold"))]);
        let qb = build_insert_query(&TABLE, &values);
        assert!(qb.sql().contains("INSERT INTO beers (name) VALUES ($1::TEXT)"));
    }

    #[test]
    fn test_update_query() {
        let values = record(&[("abv", Value::from(5))]);
        let qb = build_update_query(&TABLE, 7, &values).unwrap();
        assert_eq!(
            qb.sql(),
            "WITH written AS (UPDATE beers SET abv = $1::NUMERIC WHERE id = $2 RETURNING *) \
             SELECT to_jsonb(t) FROM (SELECT id, name, abv FROM written) AS t"
        );
    }

    #[test]
    fn test_update_query_with_nothing_to_set() {
        assert!(build_update_query(&TABLE, 7, &Record::new()).is_none());
    }

    #[test]
    fn test_bind_text() {
        assert_eq!(bind_text(&Value::Null), None);
        assert_eq!(bind_text(&Value::from("IPA")), Some("IPA".to_string()));
        assert_eq!(bind_text(&Value::from(2.5)), Some("2.5".to_string()));
        assert_eq!(bind_text(&Value::from(12)), Some("12".to_string()));
    }
}
