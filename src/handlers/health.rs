// handlers/health.rs - GET /health handler

use axum::extract::State;
use serde_json::{json, Value};

use super::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// Round-trips the store so a dead backend shows up as 503
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.records().ping().await?;
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "backend": state.records().store().backend(),
    })))
}
