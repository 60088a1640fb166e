//! OpenAI API client.
//!
//! Implements [`CompletionClient`] for OpenAI's Chat Completions API.

use super::provider::{CompletionClient, CompletionError};
use super::types::Message;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client configuration and state.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, CompletionError> {
        let messages = [Message::system(system), Message::user(user)];
        let request = ChatRequest {
            model,
            messages: &messages,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::with_status(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        let chat_response: ChatResponse = response.json().await.map_err(transport_error)?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::transport("Completion API returned no choices"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Pull a readable message out of a non-2xx response.
///
/// OpenAI-style APIs answer with `{ "error": { "message": "..." } }`; anything
/// else falls back to the raw body, then to the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.trim().is_empty());
    if let Some(message) = envelope {
        return message;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        return CompletionError::transport("Request to completion API timed out");
    }

    let cause = std::error::Error::source(&err).map(|s| s.to_string());
    let head = if err.is_decode() {
        "Failed to parse completion response".to_string()
    } else {
        // The URL is configuration, keep it out of the caller-visible text.
        err.without_url().to_string()
    };

    CompletionError::transport(match cause {
        Some(cause) if !head.contains(&cause) => format!("{head}: {cause}"),
        _ => head,
    })
}

// -----------------------------------------------------------------------------
// OpenAI DTOs (Data Transfer Objects)
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
