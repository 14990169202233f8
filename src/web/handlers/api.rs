use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::introspect;
use crate::error::AppError;
use crate::query::{export, flatten, generate, summary, validate};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub user_query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub sql_query: String,
    pub results: Vec<Map<String, Value>>,
    pub csv_base64: String,
    pub csv_filename: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn fetch_schema(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchemaResponse>, AppError> {
    let schema = introspect::get_schema(&state.db, &state.dialect).await?;
    Ok(Json(SchemaResponse { schema }))
}

/// The full pipeline: introspect, generate, validate, execute, flatten,
/// summarize, assemble. Either the whole response is produced or an error
/// status is returned; only the summary stage degrades instead of failing.
pub async fn generate_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let length = payload.user_query.chars().count();
    if length == 0 || length > 1000 {
        return Err(AppError::InvalidRequest(
            "user_query must be between 1 and 1000 characters".to_string(),
        ));
    }

    debug!("NL query: {}", payload.user_query);

    // Schema is computed exactly once per request, right here.
    let schema = introspect::get_schema(&state.db, &state.dialect).await?;

    let raw_sql =
        generate::generate_sql(&state.llm, &state.dialect, &payload.user_query, &schema).await?;

    let sql = validate::strip_code_fences(&raw_sql);
    if !validate::is_safe_select(&sql, &state.dialect) {
        return Err(AppError::ValidationRejected);
    }
    info!("validated SQL: {}", sql);

    let rows = state.db.execute(&sql).await?;
    let flat_results: Vec<Map<String, Value>> = rows.iter().map(flatten::flatten_record).collect();
    info!("query returned {} rows", flat_results.len());

    let summary = summary::summarize(&state.llm, &payload.user_query, &flat_results).await;

    let (csv_base64, csv_filename) = match export::export(&flat_results)
        .map_err(|e| AppError::Internal(format!("CSV rendering failed: {e}")))?
    {
        Some(csv) => {
            if let Some(dir) = &state.config.export.csv_dir {
                export::write_to_dir(&csv, Path::new(dir));
            }
            (csv.base64(), csv.filename)
        }
        None => (String::new(), String::new()),
    };

    Ok(Json(QueryResponse {
        sql_query: sql,
        results: flat_results,
        csv_base64,
        csv_filename,
        summary,
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
