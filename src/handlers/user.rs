// handlers/user.rs - /user and /user/:user_name handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use super::{json_body, AppState};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.records().list(&User::default()).await?;
    Ok(ApiResponse::success(users))
}

/// POST /user - userName, email and phone must all be unused
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<User> {
    let user = json_body(payload)?;
    if user.user_name.is_empty() {
        return Err(ApiError::bad_request("userName is required"));
    }

    state.records().validate_name_uniqueness(&user).await?;
    state.records().create(&user).await?;
    info!("Registered user '{}'", user.user_name);
    Ok(ApiResponse::created(user))
}

pub async fn show(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> ApiResult<User> {
    let user = state.records().get(&User::with_id(user_name)).await?;
    Ok(ApiResponse::success(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<User> {
    let mut update = json_body(payload)?;
    update.user_name = user_name;
    let user = state.records().update(update).await?;
    Ok(ApiResponse::success(user))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> ApiResult<()> {
    state.records().delete(&User::with_id(user_name)).await?;
    Ok(ApiResponse::no_content())
}
