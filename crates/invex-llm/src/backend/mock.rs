//! Scripted client for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::LlmClient;
use crate::request::{Completion, CompletionRequest};
use crate::{LlmError, Result};

enum Reply {
    Text(String),
    Status(u16, String),
}

/// Mock LLM client that replays scripted answers and records every request.
///
/// Scripted replies are consumed in order; once exhausted, the fallback
/// reply (if any) is returned for every further call.
pub struct MockLlmClient {
    script: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with each response in turn, then fail.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Reply::Text(r.into())).collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue an HTTP error reply after the already scripted ones.
    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Reply::Status(status, body.to_string()));
        self
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copies of every request received, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let next = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(Completion::new(text)),
            Some(Reply::Status(status, body)) => Err(LlmError::Status { status, body }),
            None => match &self.fallback {
                Some(text) => Ok(Completion::new(text.clone())),
                None => Err(LlmError::Connection("mock script exhausted".to_string())),
            },
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
