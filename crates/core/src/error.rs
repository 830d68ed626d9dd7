//! Shared error type for the interview agent

use thiserror::Error;

/// Top-level error type used across crates
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Observability error: {0}")]
    Observability(String),

    #[error("Media runtime error: {0}")]
    Media(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;
