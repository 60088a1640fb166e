//! The completion capability.
//!
//! The chat handler only ever talks to [`CompletionClient`], whether the
//! backend is the real OpenAI API or a deterministic stub in tests.

use async_trait::async_trait;
use thiserror::Error;

/// How a downstream failure is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The completion API rejected our credentials.
    Unauthorized,
    /// The completion API is throttling us.
    RateLimited,
    /// Anything else: other statuses, transport errors, bad payloads.
    Unknown,
}

/// Downstream status codes that get their own failure kind.
/// Every status not listed here (and a missing status) is `Unknown`.
const DOWNSTREAM_STATUS_TABLE: &[(u16, FailureKind)] = &[
    (401, FailureKind::Unauthorized),
    (429, FailureKind::RateLimited),
];

impl FailureKind {
    /// Classify a downstream status code.
    pub fn classify(status: Option<u16>) -> Self {
        status
            .and_then(|code| {
                DOWNSTREAM_STATUS_TABLE
                    .iter()
                    .find(|(known, _)| *known == code)
                    .map(|(_, kind)| *kind)
            })
            .unwrap_or(FailureKind::Unknown)
    }
}

/// A failed completion call.
///
/// `status` is the HTTP status reported by the completion API, or `None`
/// when the call never produced one (network error, timeout, malformed body).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CompletionError {
    pub status: Option<u16>,
    pub message: String,
}

impl CompletionError {
    /// Error reported by the completion API with an HTTP status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error with no downstream status attached.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        FailureKind::classify(self.status)
    }
}

/// The core trait for completion calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system message and one user message, returning the text of
    /// the first completion.
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, CompletionError>;
}
