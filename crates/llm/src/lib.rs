//! LLM integration
//!
//! Provides the `LanguageModel` trait with a Gemini HTTP backend. Two model
//! tiers are used at runtime: the main conversational model and a fast
//! "shadow" model for scoring, profiling, and background analysis.

pub mod backend;
pub mod gemini;
pub mod json;
pub mod testing;

pub use backend::{FinishReason, GenerationResult, LanguageModel};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use json::clean_json_response;
pub use testing::StaticLlm;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for interview_agent_core::Error {
    fn from(err: LlmError) -> Self {
        interview_agent_core::Error::Llm(err.to_string())
    }
}
