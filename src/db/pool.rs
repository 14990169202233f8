use crate::config::DatabaseConfig;
use crate::db::dialect::{Dialect, DialectKind};
use crate::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::{BigDecimal, Uuid};
use sqlx::{Column, Row, TypeInfo};
use tracing::debug;

/// One row as returned by the driver: column name -> JSON value, in the
/// database's column order (`serde_json` is built with `preserve_order`).
pub type ResultRow = serde_json::Map<String, Value>;

/// Connection pool bound to the dialect selected at startup.
#[derive(Clone)]
pub enum DbPool {
    Postgres(PgPool),
    MySql(MySqlPool),
}

impl DbPool {
    pub async fn connect(cfg: &DatabaseConfig, dialect: &Dialect) -> Result<Self, AppError> {
        match dialect.kind() {
            DialectKind::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(cfg.pool_size)
                    .test_before_acquire(true)
                    .connect(&cfg.url)
                    .await
                    .map_err(|e| {
                        AppError::Config(format!("failed to connect to PostgreSQL: {e}"))
                    })?;
                Ok(DbPool::Postgres(pool))
            }
            DialectKind::MySql => {
                let url = cfg.mysql_url.as_deref().ok_or_else(|| {
                    AppError::Config(
                        "database.mysql_url is required when dialect is mysql".to_string(),
                    )
                })?;
                let pool = MySqlPoolOptions::new()
                    .max_connections(cfg.pool_size)
                    .test_before_acquire(true)
                    .connect(url)
                    .await
                    .map_err(|e| AppError::Config(format!("failed to connect to MySQL: {e}")))?;
                Ok(DbPool::MySql(pool))
            }
        }
    }

    /// Runs the dialect's catalog query and returns
    /// (table_name, column_name, data_type) triples.
    pub async fn fetch_schema_rows(
        &self,
        query: &str,
        schema_filter: &str,
    ) -> Result<Vec<(String, String, String)>, sqlx::Error> {
        match self {
            DbPool::Postgres(pool) => {
                let rows = sqlx::query(query).bind(schema_filter).fetch_all(pool).await?;
                rows.iter()
                    .map(|row| {
                        Ok((
                            row.try_get::<String, _>(0)?,
                            row.try_get::<String, _>(1)?,
                            row.try_get::<String, _>(2)?,
                        ))
                    })
                    .collect()
            }
            DbPool::MySql(pool) => {
                let rows = sqlx::query(query).bind(schema_filter).fetch_all(pool).await?;
                rows.iter()
                    .map(|row| {
                        Ok((
                            mysql_catalog_string(row, 0)?,
                            mysql_catalog_string(row, 1)?,
                            mysql_catalog_string(row, 2)?,
                        ))
                    })
                    .collect()
            }
        }
    }

    /// Executes an already-validated SELECT inside an explicit transaction and
    /// maps the result set into ordered records. The transaction gives a
    /// consistent read snapshot and releases the connection on every path.
    pub async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, AppError> {
        match self {
            DbPool::Postgres(pool) => {
                let mut tx = pool.begin().await.map_err(execution_error)?;
                let rows = sqlx::query(sql)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(execution_error)?;
                tx.commit().await.map_err(execution_error)?;
                Ok(rows.iter().map(pg_row_to_record).collect())
            }
            DbPool::MySql(pool) => {
                let mut tx = pool.begin().await.map_err(execution_error)?;
                let rows = sqlx::query(sql)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(execution_error)?;
                tx.commit().await.map_err(execution_error)?;
                Ok(rows.iter().map(mysql_row_to_record).collect())
            }
        }
    }
}

fn execution_error(e: sqlx::Error) -> AppError {
    AppError::Execution(e.to_string())
}

/// MySQL's information_schema string columns sometimes surface as VARBINARY.
fn mysql_catalog_string(row: &MySqlRow, idx: usize) -> Result<String, sqlx::Error> {
    row.try_get::<String, _>(idx).or_else(|_| {
        row.try_get::<Vec<u8>, _>(idx)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn pg_row_to_record(row: &PgRow) -> ResultRow {
    let mut record = ResultRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), pg_value(row, idx));
    }
    record
}

/// Decode a PostgreSQL value into JSON by trying type-compatible decodes in
/// order. `try_get` fails fast on a type mismatch, so the first success wins;
/// NULLs short-circuit through the `Option`.
fn pg_value(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(idx) {
        return v.map(decimal_to_json).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return v.map(|dt| Value::String(dt.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v.map(|dt| Value::String(dt.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return v.map(|d| Value::String(d.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(idx) {
        return v.unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map(|f| Value::from(f as f64)).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Uuid>, _>(idx) {
        return v.map(|u| Value::String(u.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map(|b| Value::String(BASE64.encode(b))).unwrap_or(Value::Null);
    }
    debug!(
        "no JSON decoding for PostgreSQL type {}, returning null",
        row.columns()[idx].type_info().name()
    );
    Value::Null
}

fn mysql_row_to_record(row: &MySqlRow) -> ResultRow {
    let mut record = ResultRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), mysql_value(row, idx));
    }
    record
}

fn mysql_value(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(idx) {
        return v.map(decimal_to_json).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return v.map(|dt| Value::String(dt.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v.map(|dt| Value::String(dt.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return v.map(|d| Value::String(d.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(idx) {
        return v.unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map(|f| Value::from(f as f64)).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i8>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map(|b| Value::String(BASE64.encode(b))).unwrap_or(Value::Null);
    }
    debug!(
        "no JSON decoding for MySQL type {}, returning null",
        row.columns()[idx].type_info().name()
    );
    Value::Null
}

/// NUMERIC/DECIMAL values become JSON numbers when they fit an f64, and fall
/// back to their exact string form when they don't.
fn decimal_to_json(d: BigDecimal) -> Value {
    let text = d.to_string();
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::String(text))
}
