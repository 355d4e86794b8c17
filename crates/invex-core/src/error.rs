//! Error types for the invex-core library.

use thiserror::Error;

/// Longest payload excerpt carried inside an error message.
pub const PAYLOAD_SUMMARY_CHARS: usize = 240;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// The document yielded no usable text; nothing was sent to the model.
    #[error("document contains no usable text")]
    EmptyDocument,

    /// Schema registry error.
    #[error("schema error: {0}")]
    Registry(#[from] RegistryError),

    /// Extraction error for a single schema.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// PDF processing error.
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the schema registry and schema validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A schema with the same id is already registered.
    #[error("duplicate schema id: {0}")]
    DuplicateSchema(String),

    /// No schema with the given id is registered.
    #[error("unknown schema id: {0}")]
    UnknownSchema(String),

    /// The schema definition breaks a structural rule.
    #[error("invalid schema {id}: {reason}")]
    InvalidSchema { id: String, reason: String },
}

/// Errors raised while extracting one schema from a document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The provider call failed (network, auth, quota).
    #[error("model invocation failed for {schema_id}: {source}")]
    ModelInvocation {
        schema_id: String,
        #[source]
        source: invex_llm::LlmError,
    },

    /// The invocation exceeded the per-invocation timeout.
    #[error("model invocation for {schema_id} timed out after {seconds}s")]
    Timeout { schema_id: String, seconds: u64 },

    /// The provider answered, but not with a decodable JSON document.
    #[error("malformed model response for {schema_id}: {reason} (payload: {payload})")]
    MalformedResponse {
        schema_id: String,
        reason: String,
        payload: String,
    },

    /// The decoded result does not fit the schema's shape.
    #[error("malformed extraction for {schema_id}: {reason} (payload: {payload})")]
    MalformedExtraction {
        schema_id: String,
        reason: String,
        payload: String,
    },
}

impl ExtractionError {
    /// Id of the schema whose extraction failed.
    pub fn schema_id(&self) -> &str {
        match self {
            ExtractionError::ModelInvocation { schema_id, .. }
            | ExtractionError::Timeout { schema_id, .. }
            | ExtractionError::MalformedResponse { schema_id, .. }
            | ExtractionError::MalformedExtraction { schema_id, .. } => schema_id,
        }
    }

    /// Whether this is a provider-side failure rather than a shape mismatch.
    pub fn is_model_invocation(&self) -> bool {
        !matches!(self, ExtractionError::MalformedExtraction { .. })
    }
}

/// Errors related to PDF processing.
#[cfg(feature = "pdf")]
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Shorten a payload for inclusion in an error message.
pub fn summarize_payload(payload: &str) -> String {
    let trimmed = payload.trim();
    match trimmed.char_indices().nth(PAYLOAD_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
