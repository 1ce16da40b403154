//! Department statistics.

use axum::extract::State;
use axum::Json;
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;

/// `GET /api/departments/stats` — `{department: patient_count}` for every department.
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<Map<String, Value>>, ApiError> {
    let conn = ctx.open_db()?;
    let stats = db::department_stats(&conn)?;
    Ok(Json(
        stats
            .into_iter()
            .map(|(department, count)| (department.as_str().to_string(), Value::from(count)))
            .collect(),
    ))
}
