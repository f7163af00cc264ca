// handlers/course.rs - /course and /course/:course_id handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{json_body, AppState};
use crate::database::models::Course;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /course
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let courses = state.records().list(&Course::default()).await?;
    Ok(ApiResponse::success(courses))
}

/// POST /course - the id doubles as the course's database name
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Course>, JsonRejection>,
) -> ApiResult<Course> {
    let course = json_body(payload)?;
    let created = state.courses.create_course(course).await?;
    Ok(ApiResponse::created(created))
}

/// GET /course/:course_id
pub async fn show(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Course> {
    let course = state.records().get(&Course::with_id(course_id)).await?;
    Ok(ApiResponse::success(course))
}

/// PUT /course/:course_id - partial update, zero-valued fields are left alone
pub async fn update(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    payload: Result<Json<Course>, JsonRejection>,
) -> ApiResult<Course> {
    let mut update = json_body(payload)?;
    update.course_id = course_id;
    let course = state.courses.update_course(update).await?;
    Ok(ApiResponse::success(course))
}

/// DELETE /course/:course_id - refused while lessons remain
pub async fn delete(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<()> {
    state.courses.delete_course(&course_id).await?;
    Ok(ApiResponse::no_content())
}
