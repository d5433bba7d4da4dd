//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;
use validator::ValidationErrors;

/// Body of the `error` envelope returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Validation failure built from `validator` errors
    pub fn invalid(errors: &ValidationErrors, message: impl Into<String>) -> Self {
        Self::validation(field_details(errors), message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Flatten `validator` errors into `{field, error}` details, sorted by field.
///
/// Errors without an explicit message fall back to their code.
pub fn field_details(errors: &ValidationErrors) -> Vec<serde_json::Value> {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                serde_json::json!({ "field": field, "error": message })
            })
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(%trace_id, error_code = code, status_code = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(%trace_id, error_code = code, status_code = status.as_u16(), "request rejected");
        }

        let (message, details) = match self {
            AppError::Validation { details, message } => (message, details),
            AppError::Conflict { message }
            | AppError::NotFound { message }
            | AppError::BadRequest { message }
            | AppError::Unavailable { message } => (message, Vec::new()),
            // Internal details stay in the logs outside debug builds.
            AppError::Internal(e) if cfg!(debug_assertions) => (e.to_string(), Vec::new()),
            AppError::Internal(_) => ("An internal server error occurred".to_string(), Vec::new()),
        };

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
                trace_id: trace_id.to_string(),
                timestamp,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_carries_details() {
        let details = vec![serde_json::json!({"field": "number_page", "error": "is not a number"})];
        let response = AppError::validation(details.clone(), "book is invalid").into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "book is invalid");
        assert_eq!(body["error"]["details"], serde_json::Value::Array(details));
        assert!(body["error"]["trace_id"].as_str().unwrap().parse::<Uuid>().is_ok());
        assert!(!body["error"]["timestamp"].as_str().unwrap().is_empty());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::not_found("user 7").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict("favorite exists").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::unavailable("pool timed out").into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("disk on fire"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_details_are_sorted_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "title",
            validator::ValidationError::new("blank").with_message("can't be blank".into()),
        );
        errors.add("author", validator::ValidationError::new("blank"));

        assert_eq!(
            field_details(&errors),
            vec![
                serde_json::json!({ "field": "author", "error": "blank" }),
                serde_json::json!({ "field": "title", "error": "can't be blank" }),
            ]
        );
    }

    #[tokio::test]
    async fn non_validation_errors_have_empty_details() {
        let body = body_json(AppError::bad_request("user_id is required").into_response()).await;
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["error"]["details"], serde_json::json!([]));
    }
}
