//! Data models: extracted records, bundles and configuration.

pub mod bundle;
pub mod config;
pub mod record;

pub use bundle::{ExtractionBundle, SchemaResult};
pub use config::{ExtractionConfig, FailurePolicy, InvexConfig, PdfConfig, ProviderConfig, ProviderKind};
pub use record::ExtractedRecord;
