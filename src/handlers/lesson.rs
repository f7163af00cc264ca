// handlers/lesson.rs - /course/:course_ref/lesson handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{id_or_generate, json_body, AppState};
use crate::database::models::Lesson;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(
    State(state): State<AppState>,
    Path(course_ref): Path<String>,
) -> ApiResult<Vec<Lesson>> {
    let lessons = state.records().list(&Lesson::with_id(course_ref, "")).await?;
    Ok(ApiResponse::success(lessons))
}

/// POST /course/:course_ref/lesson - also appends the id to the course's lessons
pub async fn create(
    State(state): State<AppState>,
    Path(course_ref): Path<String>,
    payload: Result<Json<Lesson>, JsonRejection>,
) -> ApiResult<Lesson> {
    let mut lesson = json_body(payload)?;
    lesson.course_ref = course_ref;
    lesson.lesson_id = id_or_generate(lesson.lesson_id);

    let created = state.courses.create_lesson(lesson).await?;
    Ok(ApiResponse::created(created))
}

pub async fn show(
    State(state): State<AppState>,
    Path((course_ref, lesson_id)): Path<(String, String)>,
) -> ApiResult<Lesson> {
    let lesson = state
        .records()
        .get(&Lesson::with_id(course_ref, lesson_id))
        .await?;
    Ok(ApiResponse::success(lesson))
}

pub async fn update(
    State(state): State<AppState>,
    Path((course_ref, lesson_id)): Path<(String, String)>,
    payload: Result<Json<Lesson>, JsonRejection>,
) -> ApiResult<Lesson> {
    let mut update = json_body(payload)?;
    update.course_ref = course_ref;
    update.lesson_id = lesson_id;

    let lesson = state.courses.update_lesson(update).await?;
    Ok(ApiResponse::success(lesson))
}

/// DELETE /course/:course_ref/lesson/:lesson_id - refused while contents remain
pub async fn delete(
    State(state): State<AppState>,
    Path((course_ref, lesson_id)): Path<(String, String)>,
) -> ApiResult<()> {
    state.courses.delete_lesson(&course_ref, &lesson_id).await?;
    Ok(ApiResponse::no_content())
}
