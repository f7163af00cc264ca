// handlers/mod.rs - Route table and shared handler state
//
// Course-scoped routes carry the owning course in the path; it selects the
// database their records live in.

pub mod content;
pub mod course;
pub mod health;
pub mod lesson;
pub mod user;

use axum::{
    extract::rejection::JsonRejection,
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::services::{CourseService, RecordService};

#[derive(Clone)]
pub struct AppState {
    pub courses: CourseService,
}

impl AppState {
    pub fn new(records: RecordService) -> Self {
        Self {
            courses: CourseService::new(records),
        }
    }

    pub fn records(&self) -> &RecordService {
        self.courses.records()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/course", get(course::list).post(course::create))
        .route(
            "/course/:course_id",
            get(course::show).put(course::update).delete(course::delete),
        )
        .route(
            "/course/:course_ref/lesson",
            get(lesson::list).post(lesson::create),
        )
        .route(
            "/course/:course_ref/lesson/:lesson_id",
            get(lesson::show).put(lesson::update).delete(lesson::delete),
        )
        .route(
            "/course/:course_ref/content",
            get(content::list).post(content::create),
        )
        .route(
            "/course/:course_ref/content/:content_id",
            get(content::show).put(content::update).delete(content::delete),
        )
        .route("/user", get(user::list).post(user::register))
        .route(
            "/user/:user_name",
            get(user::show).put(user::update).delete(user::delete),
        )
        .with_state(state)
}

/// CORS policy from the security section; `*` opens it to any origin
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Unwrap a JSON body, turning extractor rejections into the error envelope
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}

/// Caller-supplied id, or a fresh one when the body left it empty
pub(crate) fn id_or_generate(id: String) -> String {
    if id.is_empty() {
        uuid::Uuid::new_v4().simple().to_string()
    } else {
        id
    }
}
