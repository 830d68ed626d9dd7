//! Configuration management for the interview agent
//!
//! Supports loading configuration from:
//! - YAML files under `config/` (personas, intelligence, competencies, stages)
//! - Environment variables (`INTERVIEW_AGENT_` prefix plus well-known names
//!   like `GOOGLE_API_KEY` and `SCYLLA_HOSTS`)
//!
//! All declarative config is read once at startup and treated as immutable
//! for the lifetime of the process; nothing is hot-reloaded during a session.

pub mod competencies;
pub mod intelligence;
pub mod personas;
pub mod settings;
pub mod stages;

pub use competencies::{CompetenciesConfig, CompetencyDefinition};
pub use intelligence::{IntelligenceConfig, StrategyDefinition};
pub use personas::{
    Identity, Localized, LocalizedList, Persona, PersonaStore, Scenario, SkillRef,
};
pub use settings::{
    load_settings, LlmSettings, ObservabilitySettings, PersistenceSettings, RuntimeEnvironment,
    ServerSettings, Settings,
};
pub use stages::{StageDefinition, StagesConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for interview_agent_core::Error {
    fn from(err: ConfigError) -> Self {
        interview_agent_core::Error::Config(err.to_string())
    }
}
