//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub observability: ObservabilitySettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,

    /// Directory holding personas/, intelligence.yaml, competencies.yaml, stages.yaml
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
}

/// HTTP server settings (health/readiness surface)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Google AI Studio API key
    #[serde(default = "default_google_api_key")]
    pub google_api_key: String,

    /// Main conversational model
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Fast model for scoring, profiling, and shadow analysis
    #[serde(default = "default_shadow_model")]
    pub shadow_model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            google_api_key: default_google_api_key(),
            gemini_model: default_gemini_model(),
            shadow_model: default_shadow_model(),
        }
    }
}

/// Observability (Opik) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    #[serde(default = "default_opik_enabled")]
    pub enabled: bool,

    #[serde(default = "default_opik_api_key")]
    pub api_key: String,

    #[serde(default = "default_opik_workspace")]
    pub workspace: String,

    #[serde(default = "default_opik_project")]
    pub project_name: String,

    #[serde(default = "default_opik_endpoint")]
    pub endpoint: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            enabled: default_opik_enabled(),
            api_key: default_opik_api_key(),
            workspace: default_opik_workspace(),
            project_name: default_opik_project(),
            endpoint: default_opik_endpoint(),
        }
    }
}

/// Persistence settings (ScyllaDB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Disabled falls back to in-memory stores (development)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

fn default_config_dir() -> String {
    "config".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_google_api_key() -> String {
    std::env::var("GOOGLE_API_KEY").unwrap_or_default()
}

fn default_gemini_model() -> String {
    std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string())
}

fn default_shadow_model() -> String {
    std::env::var("SHADOW_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string())
}

fn default_opik_enabled() -> bool {
    std::env::var("OPIK_ENABLED")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn default_opik_api_key() -> String {
    std::env::var("OPIK_API_KEY").unwrap_or_default()
}

fn default_opik_workspace() -> String {
    std::env::var("OPIK_WORKSPACE").unwrap_or_else(|_| "default".to_string())
}

fn default_opik_project() -> String {
    std::env::var("OPIK_PROJECT_NAME").unwrap_or_else(|_| "ai-interviewer".to_string())
}

fn default_opik_endpoint() -> String {
    std::env::var("OPIK_URL_OVERRIDE")
        .unwrap_or_else(|_| "https://www.comet.com/opik/api".to_string())
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "interview_agent".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.llm.google_api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.google_api_key".to_string(),
                message: "required in production".to_string(),
            });
        }
        if self.observability.enabled && self.observability.api_key.is_empty() {
            tracing::warn!("Observability enabled without an API key; provider will be disabled");
        }
        Ok(())
    }
}

/// Load settings from config files and environment
///
/// Sources, later ones winning: `config/default.{yaml,toml}`, an optional
/// environment-specific file, then `INTERVIEW_AGENT__`-prefixed env vars.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("INTERVIEW_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.config_dir, "config");
        assert!(!settings.persistence.enabled);
        assert!(!settings.llm.gemini_model.is_empty());
    }

    #[test]
    fn test_validate_development_without_key() {
        let settings = Settings::default();
        // Development tolerates a missing API key
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_production_requires_key() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.llm.google_api_key = String::new();
        assert!(settings.validate().is_err());
    }
}
