//! Run every registered schema against a document and collect the results.

mod orchestrator;

pub use orchestrator::ExtractionPipeline;
