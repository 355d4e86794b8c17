//! Provider backend implementations.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub mod mock;

use async_trait::async_trait;

use crate::{Completion, CompletionRequest, Result};

/// Trait for chat-completion providers.
///
/// This trait abstracts over the hosted and local model APIs invex can
/// use, so the extraction pipeline can hold any of them behind a
/// `Box<dyn LlmClient>`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request and return the assistant answer.
    ///
    /// Every call performs exactly one outbound request; implementations
    /// must not retry or cache.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Box<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Map a reqwest transport error to the provider error taxonomy.
#[cfg(any(feature = "openai", feature = "ollama"))]
pub(crate) fn map_transport_error(
    err: reqwest::Error,
    base_url: &str,
    timeout_secs: u64,
) -> crate::LlmError {
    if err.is_connect() {
        crate::LlmError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        crate::LlmError::Timeout(timeout_secs)
    } else {
        crate::LlmError::HttpClient(err.to_string())
    }
}

/// Turn a non-success response into `LlmError::Status`, keeping the body.
#[cfg(any(feature = "openai", feature = "ollama"))]
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(crate::LlmError::Status {
        status: status.as_u16(),
        body,
    })
}
