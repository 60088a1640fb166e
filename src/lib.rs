//! chat-proxy
//!
//! A single-endpoint HTTP proxy: `POST /chat` takes `{ "message": ... }`,
//! pairs it with a system prompt read from disk, sends both to an LLM
//! completion API and relays the reply or a normalized error.

pub mod config;
pub mod error;
pub mod handler;
pub mod llm;
pub mod prompt;
pub mod server;

pub use config::Config;
pub use error::{ChatError, ErrorResponse};
pub use handler::{ChatHandler, ChatResponse};
pub use llm::{CompletionClient, CompletionError, FailureKind, OpenAIClient};
pub use prompt::{FilePromptLoader, PromptError, PromptLoader};
pub use server::{router, AppState};
