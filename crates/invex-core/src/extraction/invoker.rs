//! Extraction provider backed by a chat-completion client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use invex_llm::{CompletionRequest, LlmClient};

use super::{ExtractionProvider, Result, prompt, response};
use crate::error::ExtractionError;
use crate::schema::RecordSchema;

/// Runs one model invocation per schema and decodes the JSON answer.
pub struct LlmExtractor<C: LlmClient> {
    client: C,
    temperature: f32,
    max_tokens: u32,
    timeout: Option<Duration>,
}

impl<C: LlmClient> LlmExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            temperature: 0.7,
            max_tokens: 4096,
            timeout: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Bound every invocation by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the completion request sent for `schema`.
    pub fn build_request(&self, schema: &RecordSchema, text: &str) -> CompletionRequest {
        CompletionRequest::new(prompt::build_messages(schema, text))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl<C: LlmClient> ExtractionProvider for LlmExtractor<C> {
    async fn extract(&self, schema: &RecordSchema, text: &str) -> Result<Value> {
        let request = self.build_request(schema, text);
        debug!(
            "Invoking {} for schema {} ({} prompt chars)",
            self.client.name(),
            schema.id(),
            request.prompt_chars()
        );

        let start = Instant::now();
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.complete(&request))
                .await
                .map_err(|_| ExtractionError::Timeout {
                    schema_id: schema.id().to_string(),
                    seconds: limit.as_secs(),
                })?,
            None => self.client.complete(&request).await,
        };

        let completion = outcome.map_err(|source| ExtractionError::ModelInvocation {
            schema_id: schema.id().to_string(),
            source,
        })?;
        debug!(
            "Schema {} answered in {:?} ({} chars)",
            schema.id(),
            start.elapsed(),
            completion.content.len()
        );

        response::parse_model_json(schema.id(), &completion.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cardinality, FieldSchema};
    use invex_llm::{Completion, LlmError, MockLlmClient, Role};
    use serde_json::json;

    fn schema() -> RecordSchema {
        RecordSchema::new("shipping_address", "shipping address", Cardinality::One)
            .with_field(FieldSchema::new("city", "city name"))
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _request: &CompletionRequest) -> invex_llm::Result<Completion> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Completion::new("{}"))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_extract_decodes_answer() {
        let client = MockLlmClient::new("```json\n{\"shipping_address\": {\"city\": \"CHICAGO\"}}\n```");
        let extractor = LlmExtractor::new(client);

        let raw = extractor.extract(&schema(), "SHIP TO ... CHICAGO").await.unwrap();
        assert_eq!(raw, json!({"shipping_address": {"city": "CHICAGO"}}));
        assert_eq!(extractor.client().call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_settings_and_text() {
        let extractor = LlmExtractor::new(MockLlmClient::new("{}"))
            .with_temperature(0.0)
            .with_max_tokens(512);
        extractor.extract(&schema(), "DOCUMENT BODY").await.unwrap();

        let requests = extractor.client().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].max_tokens, 512);
        assert_eq!(requests[0].messages[1].role, Role::User);
        assert!(requests[0].messages[1].content.contains("DOCUMENT BODY"));
    }

    #[tokio::test]
    async fn test_client_failure_is_model_invocation() {
        let client = MockLlmClient::scripted(Vec::<String>::new()).then_status(401, "bad key");
        let extractor = LlmExtractor::new(client);

        let err = extractor.extract(&schema(), "text").await.unwrap_err();
        match err {
            ExtractionError::ModelInvocation { schema_id, source } => {
                assert_eq!(schema_id, "shipping_address");
                assert!(matches!(source, LlmError::Status { status: 401, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_malformed_response() {
        let extractor = LlmExtractor::new(MockLlmClient::new("Sorry, no invoice here."));
        let err = extractor.extract(&schema(), "text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let extractor = LlmExtractor::new(SlowClient).with_timeout(Duration::from_millis(20));
        let err = extractor.extract(&schema(), "text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout { ref schema_id, .. } if schema_id == "shipping_address"));
    }
}
