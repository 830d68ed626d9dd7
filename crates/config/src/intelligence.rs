//! Intelligence configuration
//!
//! Loaded from `config/intelligence.yaml`: tech-stack keyword patterns for
//! detection and optional overrides for the technical strategy pool.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A strategic interviewing lens applied to technical rounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyDefinition {
    pub name: String,
    pub description: String,
}

/// Data-driven intelligence configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntelligenceConfig {
    /// Tech key -> lowercase keyword patterns matched against role/resume/JD
    #[serde(default)]
    pub tech_stacks: HashMap<String, Vec<String>>,

    /// Overrides for the built-in strategy pool; empty keeps the defaults
    #[serde(default)]
    pub strategies: Vec<StrategyDefinition>,
}

impl IntelligenceConfig {
    /// Load from `<config_dir>/intelligence.yaml`
    ///
    /// A missing or unparseable file degrades to the empty config so prompt
    /// composition still works without tech-stack probing.
    pub fn load_or_default(config_dir: impl AsRef<Path>) -> Self {
        let path = config_dir.as_ref().join("intelligence.yaml");
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid intelligence config");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "Intelligence config not found");
                Self::default()
            }
        }
    }

    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_dir.as_ref().join("intelligence.yaml");
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialization() {
        let yaml = r#"
tech_stacks:
  rust:
    - "rust"
    - "tokio"
  postgres:
    - "postgres"
    - "postgresql"
strategies:
  - name: "The Purist"
    description: "Clean code above all."
"#;
        let config: IntelligenceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tech_stacks["rust"], vec!["rust", "tokio"]);
        assert_eq!(config.strategies.len(), 1);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = IntelligenceConfig::load_or_default(dir.path());
        assert!(config.tech_stacks.is_empty());
        assert!(config.strategies.is_empty());
    }
}
