//! Error taxonomy for the chat endpoint.
//!
//! Each variant maps to exactly one HTTP status and one fixed `error` text.
//! Only `Failed` carries `details`.

use crate::llm::{CompletionError, FailureKind};
use crate::prompt::PromptError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Missing required field: message")]
    MissingMessage,

    #[error("Message must be a string")]
    InvalidMessageType,

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("OpenAI API key is not configured")]
    MissingApiKey,

    #[error("Invalid OpenAI API key")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Failed to process chat request")]
    Failed { details: String },
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingMessage | Self::InvalidMessageType | Self::InvalidJson => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingApiKey | Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body sent to the caller.
    pub fn body(&self) -> ErrorResponse {
        let details = match self {
            Self::Failed { details } => Some(details.clone()),
            _ => None,
        };
        ErrorResponse {
            error: self.to_string(),
            details,
        }
    }

    /// Whether the caller, rather than the proxy or downstream, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error() && !matches!(self, Self::Unauthorized | Self::RateLimited)
    }
}

impl From<CompletionError> for ChatError {
    fn from(err: CompletionError) -> Self {
        match err.kind() {
            FailureKind::Unauthorized => Self::Unauthorized,
            FailureKind::RateLimited => Self::RateLimited,
            FailureKind::Unknown => Self::Failed {
                details: err.message,
            },
        }
    }
}

impl From<PromptError> for ChatError {
    fn from(err: PromptError) -> Self {
        Self::Failed {
            details: err.to_string(),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// `{ "error": ..., "details"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ChatError::MissingMessage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::InvalidMessageType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::MissingApiKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ChatError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ChatError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_only_failed_has_details() {
        let failed = ChatError::Failed {
            details: "upstream down".to_string(),
        };
        assert_eq!(
            serde_json::to_value(failed.body()).unwrap(),
            json!({ "error": "Failed to process chat request", "details": "upstream down" })
        );
        assert_eq!(
            serde_json::to_value(ChatError::Unauthorized.body()).unwrap(),
            json!({ "error": "Invalid OpenAI API key" })
        );
    }

    #[test]
    fn test_from_completion_error() {
        let auth: ChatError = CompletionError::with_status(401, "Incorrect API key sk-xxx").into();
        assert_eq!(auth, ChatError::Unauthorized);

        let limited: ChatError = CompletionError::with_status(429, "slow down").into();
        assert_eq!(limited, ChatError::RateLimited);

        // Other downstream statuses collapse to 500.
        let bad_request: ChatError = CompletionError::with_status(400, "bad model").into();
        assert_eq!(bad_request.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(bad_request.body().details.as_deref(), Some("bad model"));
    }

    #[test]
    fn test_client_error_split() {
        assert!(ChatError::MissingMessage.is_client_error());
        assert!(!ChatError::Unauthorized.is_client_error());
        assert!(!ChatError::MissingApiKey.is_client_error());
    }
}
