//! OpenAI-compatible chat completions backend (OpenAI, Azure OpenAI, proxies).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, map_transport_error, LlmClient};
use crate::request::{ChatMessage, Completion, CompletionRequest, TokenUsage};
use crate::{LlmError, Result};

/// Default API version for Azure OpenAI deployments.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// How requests are addressed and authenticated.
#[derive(Debug, Clone)]
enum Flavor {
    /// `{base}/chat/completions`, bearer token, model named in the body.
    OpenAi { model: String },
    /// `{base}/openai/deployments/{deployment}/chat/completions`, `api-key` header.
    Azure { deployment: String, api_version: String },
}

/// HTTP client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    flavor: Flavor,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Create a client for an OpenAI-style endpoint (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(LlmError::Configuration("model name is required".to_string()));
        }
        Self::build(
            base_url,
            api_key,
            Flavor::OpenAi { model: model.to_string() },
            timeout_secs,
        )
    }

    /// Create a client for an Azure OpenAI deployment.
    pub fn azure(
        base_url: &str,
        api_key: &str,
        deployment: &str,
        api_version: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self> {
        if deployment.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Azure deployment name is required".to_string(),
            ));
        }
        Self::build(
            base_url,
            api_key,
            Flavor::Azure {
                deployment: deployment.to_string(),
                api_version: api_version.unwrap_or(DEFAULT_AZURE_API_VERSION).to_string(),
            },
            timeout_secs,
        )
    }

    fn build(base_url: &str, api_key: &str, flavor: Flavor, timeout_secs: u64) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(LlmError::Configuration("base URL is required".to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            flavor,
            client,
            timeout_secs,
        })
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        match &self.flavor {
            Flavor::OpenAi { .. } => format!("{}/chat/completions", self.base_url),
            Flavor::Azure { deployment, api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, deployment, api_version
            ),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let url = self.endpoint();
        let model = match &self.flavor {
            Flavor::OpenAi { model } => Some(model.as_str()),
            Flavor::Azure { .. } => None,
        };
        let body = ChatCompletionBody {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("POST {} ({} prompt chars)", url, request.prompt_chars());

        let builder = self.client.post(&url).json(&body);
        let builder = match &self.flavor {
            Flavor::OpenAi { .. } => builder.bearer_auth(&self.api_key),
            Flavor::Azure { .. } => builder.header("api-key", &self.api_key),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;
        let response = check_status(response).await?;

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ResponseParsing("response has no message content".to_string()))?;

        Ok(Completion {
            content,
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }

    fn name(&self) -> &str {
        match self.flavor {
            Flavor::OpenAi { .. } => "openai",
            Flavor::Azure { .. } => "azure",
        }
    }
}
