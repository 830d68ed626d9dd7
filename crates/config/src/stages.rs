//! Interview stage definitions
//!
//! Loaded from `config/stages.yaml`: the ordered application stages with
//! their display names, persona IDs, and default durations.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use interview_agent_core::StageType;

use crate::ConfigError;

/// Configuration for one interview stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDefinition {
    pub id: u32,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub persona_id: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
}

fn default_duration() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StagesFile {
    #[serde(default)]
    stages: Vec<StageDefinition>,
}

/// Stage lookup table
#[derive(Debug, Clone)]
pub struct StagesConfig {
    by_number: HashMap<u32, StageDefinition>,
    by_type: HashMap<StageType, StageDefinition>,
}

impl StagesConfig {
    /// Load from `<config_dir>/stages.yaml`, falling back to the built-in
    /// three-stage pipeline when the file is missing or invalid.
    pub fn load_or_default(config_dir: impl AsRef<Path>) -> Self {
        let path = config_dir.as_ref().join("stages.yaml");
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str::<StagesFile>(&content) {
                Ok(file) if !file.stages.is_empty() => Self::from_definitions(file.stages),
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "Empty stage config, using defaults");
                    Self::defaults()
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid stage config");
                    Self::defaults()
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "Stage config not found, using defaults");
                Self::defaults()
            }
        }
    }

    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_dir.as_ref().join("stages.yaml");
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let file: StagesFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(Self::from_definitions(file.stages))
    }

    fn from_definitions(stages: Vec<StageDefinition>) -> Self {
        let mut by_number = HashMap::new();
        let mut by_type = HashMap::new();
        for stage in stages {
            by_number.insert(stage.id, stage.clone());
            by_type.insert(stage.stage_type, stage);
        }
        Self { by_number, by_type }
    }

    fn defaults() -> Self {
        Self::from_definitions(vec![
            StageDefinition {
                id: 1,
                stage_type: StageType::Hr,
                name: "HR Screening".to_string(),
                description: "Culture fit and career history".to_string(),
                persona_id: "hr_recruiter".to_string(),
                duration_minutes: 15,
            },
            StageDefinition {
                id: 2,
                stage_type: StageType::Technical,
                name: "Technical Round".to_string(),
                description: "Hard skills and system thinking".to_string(),
                persona_id: "tech_lead".to_string(),
                duration_minutes: 30,
            },
            StageDefinition {
                id: 3,
                stage_type: StageType::Behavioral,
                name: "Manager Round".to_string(),
                description: "Leadership and collaboration".to_string(),
                persona_id: "behavioral_manager".to_string(),
                duration_minutes: 20,
            },
        ])
    }

    pub fn by_number(&self, stage_number: u32) -> Option<&StageDefinition> {
        self.by_number.get(&stage_number)
    }

    pub fn by_type(&self, stage_type: StageType) -> Option<&StageDefinition> {
        self.by_type.get(&stage_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StagesConfig::defaults();
        assert_eq!(config.by_number(1).unwrap().stage_type, StageType::Hr);
        assert_eq!(config.by_type(StageType::Technical).unwrap().id, 2);
        assert_eq!(config.by_type(StageType::Behavioral).unwrap().persona_id, "behavioral_manager");
        assert!(config.by_type(StageType::Practice).is_none());
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stages.yaml"),
            r#"
stages:
  - id: 1
    type: hr
    name: "People Screen"
    persona_id: hr_recruiter
    duration_minutes: 10
"#,
        )
        .unwrap();

        let config = StagesConfig::load(dir.path()).unwrap();
        assert_eq!(config.by_number(1).unwrap().name, "People Screen");
        assert_eq!(config.by_number(1).unwrap().duration_minutes, 10);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = StagesConfig::load_or_default(dir.path());
        assert!(config.by_number(2).is_some());
    }
}
