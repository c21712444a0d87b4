use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::domains::generation::GenerationError;

/// Message returned when either request field is missing or blank.
pub const MISSING_FIELDS: &str = "Missing prompt or userId";

/// Errors surfaced to chat callers. Everything else in the pipeline degrades.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Caller's fault; nothing downstream was attempted
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{0}")]
    Internal(String),
}

impl ChatError {
    pub fn missing_fields() -> Self {
        ChatError::Validation(MISSING_FIELDS.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::Generation(_) | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChatError::missing_fields().status_code(), StatusCode::BAD_REQUEST);

        let timeout = ChatError::from(GenerationError::Timeout {
            attempts: 60,
            elapsed: Duration::from_secs(60),
        });
        assert_eq!(timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(timeout.to_string().contains("timed out"));

        assert_eq!(
            ChatError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        assert_eq!(ChatError::missing_fields().to_string(), "Missing prompt or userId");
    }
}
