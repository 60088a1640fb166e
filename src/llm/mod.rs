//! LLM layer
//!
//! Everything that talks to the completion API:
//! - the `CompletionClient` abstraction and its failure classification
//! - the OpenAI Chat Completions client
//! - provider-neutral message types

pub mod openai;
pub mod provider;
pub mod types;

// Re-export key types
pub use openai::OpenAIClient;
pub use provider::{CompletionClient, CompletionError, FailureKind};
pub use types::{Message, Role};
