//! Error types for the Reel API.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{ "success": false, "message": ... }` with a matching status code.
//!
//! ```text
//! ValidationError / JSON or path rejection  → 400
//! DbError::NotFound, missing entity         → 404
//! RentalAlreadyReturned, FK/unique conflict → 409
//! IncompleteCustomerInfo                    → 422 + needsCustomerInfo
//! any other DbError                         → 500, generic message, logged
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use reel_core::{CoreError, ValidationError};
use reel_db::{DbError, WorkflowError};

/// Reel API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    NeedsCustomerInfo {
        message: String,
        missing: Vec<&'static str>,
    },

    /// Store failure. The detail is logged, never sent to the client.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::Conflict("The record is still referenced by other records".to_string())
            }
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Storage(other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IncompleteCustomerInfo { ref missing, .. } => ApiError::NeedsCustomerInfo {
                missing: missing.clone(),
                message: err.to_string(),
            },
            CoreError::RentalAlreadyReturned { .. } => ApiError::Conflict(err.to_string()),
            CoreError::Validation(inner) => inner.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Storage(db) => db.into(),
            WorkflowError::Rule(rule) => rule.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    needs_customer_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<Vec<&'static str>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NeedsCustomerInfo { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self {
            ApiError::Storage(err) => {
                error!(error = %err, "Storage failure");
                ErrorBody {
                    success: false,
                    message: "Internal server error".to_string(),
                    needs_customer_info: None,
                    missing: None,
                }
            }
            ApiError::NeedsCustomerInfo { message, missing } => ErrorBody {
                success: false,
                message,
                needs_customer_info: Some(true),
                missing: Some(missing),
            },
            other => ErrorBody {
                success: false,
                message: other.to_string(),
                needs_customer_info: None,
                missing: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ValidationError::Required {
                    field: "email".to_string(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (DbError::not_found("Customer", 9).into(), StatusCode::NOT_FOUND),
            (
                CoreError::RentalAlreadyReturned { rental_id: 1 }.into(),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::IncompleteCustomerInfo {
                    email: "a@b.c".to_string(),
                    missing: vec!["last_name"],
                }
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DbError::QueryFailed("no such table: rental".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
