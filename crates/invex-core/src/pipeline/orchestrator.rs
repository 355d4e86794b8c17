//! Pipeline orchestrator.

use std::time::Instant;

use futures_util::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, InvexError};
use crate::extraction::{self, ExtractionProvider};
use crate::models::{ExtractionBundle, ExtractionConfig, FailurePolicy, SchemaResult};
use crate::schema::{RecordSchema, SchemaRegistry};

/// Drives one provider over all schemas of a registry.
///
/// Schemas are processed in registry order and the resulting bundle keeps
/// that order, whether or not invocations run concurrently.
pub struct ExtractionPipeline<P: ExtractionProvider> {
    provider: P,
    failure_policy: FailurePolicy,
    concurrent: bool,
    min_text_length: usize,
}

impl<P: ExtractionProvider> ExtractionPipeline<P> {
    /// Sequential, fail-fast pipeline.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            failure_policy: FailurePolicy::FailFast,
            concurrent: false,
            min_text_length: 1,
        }
    }

    /// Apply the `extraction` config section.
    pub fn with_config(self, config: &ExtractionConfig) -> Self {
        self.with_failure_policy(config.failure_policy)
            .with_concurrency(config.concurrent)
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Invoke all schemas at once instead of one after another.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Trimmed text shorter than this counts as an empty document.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min.max(1);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Whether `text` would be rejected as an empty document.
    pub fn is_empty_document(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_text_length
    }

    /// Extract every schema in `registry` from `text`.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failing schema aborts the
    /// run and no bundle is returned. Under [`FailurePolicy::Continue`] the
    /// failure is recorded as [`SchemaResult::Failed`] and the run goes on.
    pub async fn run(&self, text: &str, registry: &SchemaRegistry) -> crate::Result<ExtractionBundle> {
        if self.is_empty_document(text) {
            return Err(InvexError::EmptyDocument);
        }

        let start = Instant::now();
        info!(
            "Extracting {} schemas from {} chars of text ({})",
            registry.len(),
            text.len(),
            if self.concurrent { "concurrent" } else { "sequential" }
        );

        let results = if self.concurrent {
            self.run_concurrent(text, registry).await?
        } else {
            self.run_sequential(text, registry).await?
        };

        let mut bundle = ExtractionBundle::new();
        for (schema, result) in registry.all().iter().zip(results) {
            bundle.insert(schema.id(), result);
        }

        info!(
            "Extraction finished in {:?}: {} schemas, {} failed",
            start.elapsed(),
            bundle.len(),
            bundle.failures().count()
        );
        Ok(bundle)
    }

    async fn run_sequential(&self, text: &str, registry: &SchemaRegistry) -> crate::Result<Vec<SchemaResult>> {
        let mut results = Vec::with_capacity(registry.len());
        for schema in registry.all() {
            let outcome = self.extract_one(schema, text).await;
            results.push(self.settle(outcome)?);
        }
        Ok(results)
    }

    async fn run_concurrent(&self, text: &str, registry: &SchemaRegistry) -> crate::Result<Vec<SchemaResult>> {
        let tasks = registry.all().iter().map(|schema| self.extract_one(schema, text));

        match self.failure_policy {
            FailurePolicy::FailFast => Ok(try_join_all(tasks).await?),
            FailurePolicy::Continue => join_all(tasks)
                .await
                .into_iter()
                .map(|outcome| self.settle(outcome))
                .collect(),
        }
    }

    async fn extract_one(&self, schema: &RecordSchema, text: &str) -> extraction::Result<SchemaResult> {
        let start = Instant::now();
        let raw = self.provider.extract(schema, text).await?;
        let result = extraction::normalize(schema, &raw)?;
        debug!(
            "Schema {} ({}) produced {} records in {:?}",
            schema.id(),
            schema.cardinality(),
            result.records().len(),
            start.elapsed()
        );
        Ok(result)
    }

    fn settle(&self, outcome: extraction::Result<SchemaResult>) -> crate::Result<SchemaResult> {
        match (outcome, self.failure_policy) {
            (Ok(result), _) => Ok(result),
            (Err(e), FailurePolicy::FailFast) => Err(e.into()),
            (Err(e), FailurePolicy::Continue) => {
                warn!("Schema {} failed, continuing: {}", e.schema_id(), e);
                Ok(failed(&e))
            }
        }
    }
}

fn failed(error: &ExtractionError) -> SchemaResult {
    SchemaResult::Failed {
        error: error.to_string(),
    }
}
