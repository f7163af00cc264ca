// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::error::StoreError;
use crate::services::CourseError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::DuplicateKey { .. }
            | StoreError::Conflict { .. }
            | StoreError::VersionConflict { .. } => ApiError::conflict(err.to_string()),
            StoreError::MissingContext(_) | StoreError::InvalidNamespace(_) => {
                ApiError::bad_request(err.to_string())
            }
            StoreError::Decode { .. } | StoreError::Encode(_) | StoreError::NotAnArray { .. } => {
                // Schema drift between stored data and the record types
                tracing::error!("Document codec error: {}", err);
                ApiError::internal_server_error("Stored data could not be processed")
            }
            StoreError::Timeout { .. } => {
                tracing::error!("Store timeout: {}", err);
                ApiError::service_unavailable("Database did not respond in time")
            }
            StoreError::Mongo(ref mongo_err) => {
                // Log the real error but return generic message
                tracing::error!("MongoDB error: {}", mongo_err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::ConfigMissing(_) => {
                tracing::error!("Configuration error: {}", err);
                ApiError::internal_server_error("Service is misconfigured")
            }
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::Store(store_err) => store_err.into(),
            CourseError::NotEmpty { .. } => ApiError::conflict(err.to_string()),
            // Already logged with identifiers where it happened
            CourseError::PartialSync { .. } => ApiError::internal_server_error(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::namespace::{Namespace, RecordKind};

    fn ns() -> Namespace {
        Namespace::new("praromvik", "courses")
    }

    #[test]
    fn store_errors_map_to_http_statuses() {
        let cases = [
            (StoreError::not_found(&ns(), "x"), 404),
            (StoreError::duplicate_key(&ns(), "x"), 409),
            (
                StoreError::Conflict {
                    field: "email".into(),
                    value: "a@b.c".into(),
                },
                409,
            ),
            (
                StoreError::VersionConflict {
                    namespace: ns(),
                    id: "x".into(),
                    expected: 3,
                },
                409,
            ),
            (StoreError::MissingContext(RecordKind::Lesson), 400),
            (StoreError::InvalidNamespace("a.b".into()), 400),
            (
                StoreError::Timeout {
                    operation: "get",
                    elapsed_ms: 10,
                },
                503,
            ),
            (StoreError::ConfigMissing("MONGODB_URI"), 500),
            (StoreError::not_an_array(&ns(), "x", "lessons"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn course_errors_map_to_http_statuses() {
        let not_empty = CourseError::NotEmpty {
            kind: RecordKind::Course,
            id: "rust101".into(),
            field: "lessons",
            remaining: 2,
        };
        assert_eq!(ApiError::from(not_empty).status_code(), 409);

        let partial = CourseError::PartialSync {
            action: "push",
            child: "l1".into(),
            parent: "course 'rust101'".into(),
            source: StoreError::not_found(&ns(), "rust101"),
        };
        let api = ApiError::from(partial);
        assert_eq!(api.status_code(), 500);
        assert!(api.message().contains("l1"));
    }

    #[test]
    fn error_body_carries_code_and_message() {
        let body = ApiError::not_found("gone").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "gone");
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
