//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for invex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Model provider configuration.
    pub provider: ProviderConfig,

    /// Pipeline configuration.
    pub extraction: ExtractionConfig,

    /// Document text configuration.
    pub pdf: PdfConfig,

    /// Schema file replacing the built-in invoice schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<PathBuf>,
}

/// Which provider API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or any OpenAI-compatible endpoint.
    #[default]
    OpenAi,
    /// Azure OpenAI deployment.
    Azure,
    /// Local Ollama instance.
    Ollama,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            "azure" | "azure_ad" => Ok(ProviderKind::Azure),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("unknown provider type: {}", other)),
        }
    }
}

/// Model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API flavor.
    pub kind: ProviderKind,

    /// API base URL.
    pub base_url: String,

    /// API key. Usually supplied through the environment instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name (OpenAI, Ollama).
    pub model: String,

    /// Deployment name (Azure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    /// API version (Azure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum generated tokens per call.
    pub max_tokens: u32,

    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4".to_string(),
            deployment: None,
            api_version: None,
            temperature: 0.7,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

/// What the pipeline does when one schema fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run and return the first error.
    #[default]
    FailFast,
    /// Record the failure in the bundle and go on with the next schema.
    Continue,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run all schemas at once instead of one after another.
    pub concurrent: bool,

    /// Behavior on a per-schema failure.
    pub failure_policy: FailurePolicy,

    /// Per-invocation timeout at the extraction boundary, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_timeout_secs: Option<u64>,
}

/// Document text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-whitespace length for a document to count as non-empty.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Environment variables read by [`InvexConfig::apply_env`].
pub const ENV_API_TYPE: &str = "OPENAI_API_TYPE";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_API_VERSION: &str = "OPENAI_API_VERSION";
pub const ENV_API_DEPLOYMENT: &str = "OPENAI_API_DEPLOYMENT";
pub const ENV_API_MODEL: &str = "OPENAI_API_MODEL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Override provider settings from the process environment.
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override provider settings from a variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(kind) = get(ENV_API_TYPE) {
            self.provider.kind = kind.parse().map_err(crate::InvexError::Config)?;
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.provider.base_url = base;
        }
        if let Some(version) = get(ENV_API_VERSION) {
            self.provider.api_version = Some(version);
        }
        if let Some(deployment) = get(ENV_API_DEPLOYMENT) {
            self.provider.deployment = Some(deployment);
        }
        if let Some(model) = get(ENV_API_MODEL) {
            self.provider.model = model;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.provider.api_key = Some(key);
        }
        Ok(())
    }
}
