use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};

use crate::filter::types::{SqlParam, SqlResult};

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

fn bind_param<'q>(q: PgQuery<'q>, param: &'q SqlParam) -> PgQuery<'q> {
    match param {
        SqlParam::Uuid(id) => q.bind(*id),
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Json(v) => q.bind(v),
    }
}

fn build(sql: &SqlResult) -> PgQuery<'_> {
    sql.params.iter().fold(sqlx::query(&sql.query), bind_param)
}

fn json_row(row: &sqlx::postgres::PgRow) -> Result<serde_json::Map<String, Value>, sqlx::Error> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(sqlx::Error::Decode(format!("expected JSON object row, got {}", other).into())),
    }
}

/// Run a statement that yields `row_to_json` rows.
pub async fn fetch_rows(pool: &PgPool, sql: &SqlResult) -> Result<Vec<serde_json::Map<String, Value>>, sqlx::Error> {
    let rows = build(sql).fetch_all(pool).await?;
    rows.iter().map(json_row).collect()
}

pub async fn fetch_optional_row(
    pool: &PgPool,
    sql: &SqlResult,
) -> Result<Option<serde_json::Map<String, Value>>, sqlx::Error> {
    build(sql).fetch_optional(pool).await?.as_ref().map(json_row).transpose()
}

/// Rows affected.
pub async fn execute(pool: &PgPool, sql: &SqlResult) -> Result<u64, sqlx::Error> {
    Ok(build(sql).execute(pool).await?.rows_affected())
}
