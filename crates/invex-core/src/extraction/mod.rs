//! Schema-driven extraction: model invocation and result normalization.

mod invoker;
mod normalizer;
pub mod prompt;
mod response;

pub use invoker::LlmExtractor;
pub use normalizer::normalize;
pub use response::parse_model_json;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::schema::RecordSchema;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for structured-extraction providers.
///
/// Given one schema and the full document text, a provider returns the raw,
/// untyped result the model produced for that schema. Shape checking is left
/// to [`normalize`].
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Extract the raw result for `schema` from `text`.
    ///
    /// Each call performs one model invocation; nothing is cached or retried.
    async fn extract(&self, schema: &RecordSchema, text: &str) -> Result<Value>;
}

