//! Error handling for the shelf HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// One message per rejected field, surfaced verbatim as `error.message`
    #[error("validation failed: {}", .messages.join("; "))]
    Validation { messages: Vec<String>, code: String },

    #[error("conflict: {message}")]
    Conflict { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation {
            messages,
            code: "validation_error".to_string(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: "conflict".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let status = self.status();

        let (error_code, message) = match self {
            AppError::Validation { messages, code } => (code, json!(messages)),
            AppError::Conflict { message, code }
            | AppError::NotFound { message, code }
            | AppError::BadRequest { message, code } => (code, json!(message)),
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = ?e, "internal error");
                ("internal_error".to_string(), json!(e.to_string()))
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request rejected"
            );
        }

        // In production, we might want to hide internal error details
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            json!("An internal server error occurred")
        } else {
            message
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
                "trace_id": error_id.to_string(),
                "timestamp": timestamp
            }
        });

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let messages = vec!["amazon_url must be a valid absolute URL".to_string()];
        let error = AppError::validation(messages.clone());

        match error {
            AppError::Validation { messages: m, code } => {
                assert_eq!(m, messages);
                assert_eq!(code, "validation_error");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_error_response_mapping() {
        let error = AppError::not_found("Resource not found");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            AppError::conflict("taken").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::bad_request("bad json").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let error = AppError::Internal(internal_error);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validation_body_lists_messages() {
        let response = AppError::validation(vec![
            "amazon_url must be a valid absolute URL".to_string(),
            "pages must be a positive integer".to_string(),
        ])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let messages = body["error"]["message"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].as_str().unwrap().contains("amazon_url"));
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["status"], 400);
    }

    #[tokio::test]
    async fn test_error_response_format() {
        let response = AppError::not_found("No book with isbn '42'").into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "No book with isbn '42'");
        let trace_id = body["error"]["trace_id"].as_str().unwrap();
        assert!(Uuid::parse_str(trace_id).is_ok());
        assert!(body["error"]["timestamp"].is_string());
    }
}
