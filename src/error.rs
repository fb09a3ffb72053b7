//! Error types for the Library Desk server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error kinds carried in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadValue,
    Duplicate,
    DbFailure,
    Timeout,
    Failure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::BadValue => "bad_value",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::DbFailure => "db_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Failure => "failure",
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`
    pub fn from_unique_violation(error: sqlx::Error, message: impl Into<String>) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
            _ => AppError::Database(error),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,
    /// Human-readable message, shown verbatim by clients
    pub error: String,
    pub kind: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorKind::NotFound, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorKind::BadValue, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorKind::BadValue, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorKind::Duplicate, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::warn!("Timed out: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, ErrorKind::Timeout, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            status: "error".to_string(),
            error: message,
            kind: kind.as_str().to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::fmt;

    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[derive(Debug)]
    struct UniqueViolation;

    impl fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[tokio::test]
    async fn not_found_body_carries_message_and_kind() {
        let (status, body) = body_of(AppError::NotFound("Book 7 not found".into())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Book 7 not found");
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn bad_request_is_a_bad_value() {
        let (status, body) = body_of(AppError::BadRequest("Library holder not found".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Library holder not found");
        assert_eq!(body["kind"], "bad_value");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = body_of(AppError::Internal("pool exhausted".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["kind"], "failure");
    }

    #[tokio::test]
    async fn timeout_maps_to_504() {
        let (status, body) = body_of(AppError::Timeout("Checkout timed out".into())).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["kind"], "timeout");
    }

    #[tokio::test]
    async fn unique_violation_becomes_conflict() {
        let error = AppError::from_unique_violation(
            sqlx::Error::Database(Box::new(UniqueViolation)),
            "Holder 'Alice' already exists",
        );
        assert!(matches!(error, AppError::Conflict(_)));

        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Holder 'Alice' already exists");
        assert_eq!(body["kind"], "duplicate");
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        let error = AppError::from_unique_violation(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(error, AppError::Database(_)));
    }
}
