//! LLM provider abstraction layer for invex.
//!
//! This crate provides a unified chat-completion interface over the
//! providers invex can talk to:
//! - OpenAI-compatible endpoints, including Azure OpenAI deployments
//! - a local Ollama instance
//!
//! Backends are selected with cargo features; `MockLlmClient` is always
//! available for tests and offline runs.

mod backend;
mod error;
mod request;

pub use backend::LlmClient;
pub use backend::mock::MockLlmClient;
pub use error::LlmError;
pub use request::{ChatMessage, Completion, CompletionRequest, Role, TokenUsage};

#[cfg(feature = "openai")]
pub use backend::openai::OpenAiClient;

#[cfg(feature = "ollama")]
pub use backend::ollama::OllamaClient;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, LlmError>;
