//! The chat request pipeline.
//!
//! validate → load system prompt → one completion call → map the result.
//! No retries, no state carried between requests.

use crate::config::Config;
use crate::error::ChatError;
use crate::llm::{CompletionClient, OpenAIClient};
use crate::prompt::{FilePromptLoader, PromptLoader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// `{ "output": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub output: String,
}

/// Handles `POST /chat` bodies.
///
/// Holds only read-only data, so one instance is shared by every request.
pub struct ChatHandler {
    client: Arc<dyn CompletionClient>,
    prompts: Arc<dyn PromptLoader>,
    api_key: Option<String>,
    model: String,
}

impl ChatHandler {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        client: Arc<dyn CompletionClient>,
        prompts: Arc<dyn PromptLoader>,
    ) -> Self {
        Self {
            client,
            prompts,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
        }
    }

    /// Wire up the OpenAI client and the file-backed prompt from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAIClient::new(
            config.api_key().unwrap_or_default(),
            config.api_base_url.clone(),
            config.request_timeout(),
        )
        .context("Failed to build HTTP client")?;
        let prompts = FilePromptLoader::new(config.system_prompt_path.clone());

        Ok(Self::new(
            config.api_key().map(str::to_string),
            config.model.clone(),
            Arc::new(client),
            Arc::new(prompts),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one request body through the pipeline. Every failure is logged once.
    pub async fn handle(&self, body: &Value) -> Result<ChatResponse, ChatError> {
        self.process(body).await.inspect_err(log_failure)
    }

    async fn process(&self, body: &Value) -> Result<ChatResponse, ChatError> {
        let message = extract_message(body)?;

        if self.api_key.is_none() {
            return Err(ChatError::MissingApiKey);
        }

        let system_prompt = self.prompts.load().await?;
        debug!(
            model = %self.model,
            prompt_len = system_prompt.len(),
            message_len = message.len(),
            "Sending completion request"
        );

        let output = self
            .client
            .complete(&self.model, &system_prompt, message)
            .await?;

        Ok(ChatResponse { output })
    }
}

/// Pull `message` out of the body.
///
/// Absent, `null`, `""`, `0` and `false` all count as missing; any other
/// non-string value is the wrong type.
pub fn extract_message(body: &Value) -> Result<&str, ChatError> {
    let message = body.get("message").unwrap_or(&Value::Null);
    if is_falsy(message) {
        return Err(ChatError::MissingMessage);
    }
    message.as_str().ok_or(ChatError::InvalidMessageType)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn log_failure(err: &ChatError) {
    let status = err.status().as_u16();
    match err {
        ChatError::Failed { details } => {
            error!(status, details = %details, "Chat request failed")
        }
        ChatError::MissingApiKey => error!(status, "{}", err),
        _ if err.is_client_error() => debug!(status, "Rejected chat request: {}", err),
        _ => warn!(status, "Completion API refused request: {}", err),
    }
}
