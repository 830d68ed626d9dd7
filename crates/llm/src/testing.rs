//! Test backends
//!
//! `StaticLlm` replays canned responses and records prompts so higher-level
//! crates can unit-test LLM-driven logic without a network.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{FinishReason, GenerationResult, LanguageModel};
use crate::LlmError;

/// Canned-response backend for tests
#[derive(Clone, Default)]
pub struct StaticLlm {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StaticLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that replays the given responses in order
    pub fn with_responses(responses: Vec<String>) -> Self {
        let llm = Self::new();
        for response in responses {
            llm.push_response(response);
        }
        llm
    }

    /// Backend whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        let llm = Self::new();
        llm.responses.lock().push_back(Err(message.into()));
        llm
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().push_back(Ok(response.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Prompts seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for StaticLlm {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, LlmError> {
        self.prompts.lock().push(prompt.to_string());

        // An exhausted queue keeps failing rather than panicking so tests can
        // assert fallback behavior.
        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(text)) => Ok(GenerationResult {
                text,
                tokens: 0,
                latency_ms: 0,
                finish_reason: FinishReason::Stop,
            }),
            Some(Err(message)) => Err(LlmError::Api(message)),
            None => Err(LlmError::Api("no canned response".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "static-test-model"
    }
}
