// handlers/content.rs - /course/:course_ref/content handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{id_or_generate, json_body, AppState};
use crate::database::models::Content;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(
    State(state): State<AppState>,
    Path(course_ref): Path<String>,
) -> ApiResult<Vec<Content>> {
    let contents = state.records().list(&Content::with_id(course_ref, "")).await?;
    Ok(ApiResponse::success(contents))
}

/// POST /course/:course_ref/content - body names the owning lesson in `lessonRef`
pub async fn create(
    State(state): State<AppState>,
    Path(course_ref): Path<String>,
    payload: Result<Json<Content>, JsonRejection>,
) -> ApiResult<Content> {
    let mut content = json_body(payload)?;
    if content.lesson_ref.is_empty() {
        return Err(ApiError::bad_request("lessonRef is required"));
    }
    content.course_ref = course_ref;
    content.content_id = id_or_generate(content.content_id);

    let created = state.courses.create_content(content).await?;
    Ok(ApiResponse::created(created))
}

pub async fn show(
    State(state): State<AppState>,
    Path((course_ref, content_id)): Path<(String, String)>,
) -> ApiResult<Content> {
    let content = state
        .records()
        .get(&Content::with_id(course_ref, content_id))
        .await?;
    Ok(ApiResponse::success(content))
}

/// PUT /course/:course_ref/content/:content_id - `lessonRef` is not settable
pub async fn update(
    State(state): State<AppState>,
    Path((course_ref, content_id)): Path<(String, String)>,
    payload: Result<Json<Content>, JsonRejection>,
) -> ApiResult<Content> {
    let mut update = json_body(payload)?;
    update.course_ref = course_ref;
    update.content_id = content_id;

    let content = state.courses.update_content(update).await?;
    Ok(ApiResponse::success(content))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((course_ref, content_id)): Path<(String, String)>,
) -> ApiResult<()> {
    state.courses.delete_content(&course_ref, &content_id).await?;
    Ok(ApiResponse::no_content())
}
