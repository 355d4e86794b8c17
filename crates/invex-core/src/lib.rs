//! Core library for LLM-backed invoice field extraction.
//!
//! This crate provides:
//! - Record schemas and a registry (with the built-in invoice schemas)
//! - Schema-driven extraction through a chat-completion model
//! - Normalization of raw model output into records of fixed shape
//! - A pipeline that runs every schema against one document
//! - PDF text extraction and invoice consistency checks

pub mod error;
pub mod extraction;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod pipeline;
pub mod schema;

pub use error::{ExtractionError, InvexError, RegistryError, Result};
#[cfg(feature = "pdf")]
pub use error::PdfError;
pub use extraction::{normalize, ExtractionProvider, LlmExtractor};
pub use invoice::check_bundle;
pub use models::{
    ExtractedRecord, ExtractionBundle, FailurePolicy, InvexConfig, ProviderKind, SchemaResult,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::ExtractionPipeline;
pub use schema::{invoice_registry, Cardinality, FieldSchema, RecordSchema, SchemaRegistry};

/// Re-export model client types.
pub use invex_llm::{LlmClient, LlmError, MockLlmClient};
