//! Competency framework configuration
//!
//! Loaded from `config/competencies.yaml`: competency definitions with
//! rubrics, the dimension->competency map, per-role weights, and the
//! competencies each stage focuses on.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use interview_agent_core::StageType;

use crate::ConfigError;

/// Definition of one competency
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompetencyDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Scoring dimensions that roll up into this competency
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Score range "low-high" -> human-readable level
    #[serde(default)]
    pub rubric: HashMap<String, String>,
}

/// Competency framework
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompetenciesConfig {
    #[serde(default)]
    pub competencies: HashMap<String, CompetencyDefinition>,

    /// Dimension name -> competency name
    #[serde(default)]
    pub dimension_competency_map: HashMap<String, String>,

    /// Role name -> competency -> weight; weights per role sum to 1.0
    #[serde(default)]
    pub role_competency_weights: HashMap<String, HashMap<String, f64>>,

    /// Stage type -> competencies to prioritize
    #[serde(default)]
    pub stage_competency_focus: HashMap<String, Vec<String>>,
}

impl CompetenciesConfig {
    /// Load from `<config_dir>/competencies.yaml`, degrading to the empty
    /// config (default weights, default rubric bands) when unavailable.
    pub fn load_or_default(config_dir: impl AsRef<Path>) -> Self {
        let path = config_dir.as_ref().join("competencies.yaml");
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid competencies config");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "Competencies config not found");
                Self::default()
            }
        }
    }

    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_dir.as_ref().join("competencies.yaml");
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Map a scoring dimension to its parent competency
    pub fn map_dimension(&self, dimension: &str) -> &str {
        self.dimension_competency_map
            .get(dimension)
            .map(|s| s.as_str())
            .unwrap_or("general")
    }

    /// Competency weights for a role: exact match, then case-insensitive
    /// substring match in either direction, then defaults.
    pub fn role_weights(&self, job_role: &str) -> HashMap<String, f64> {
        if let Some(weights) = self.role_competency_weights.get(job_role) {
            return weights.clone();
        }

        let job_lower = job_role.to_lowercase();
        for (role, weights) in &self.role_competency_weights {
            if role == "default" {
                continue;
            }
            let role_lower = role.to_lowercase();
            if job_lower.contains(&role_lower) || role_lower.contains(&job_lower) {
                return weights.clone();
            }
        }

        self.role_competency_weights
            .get("default")
            .cloned()
            .unwrap_or_else(default_weights)
    }

    /// Competencies prioritized for a stage
    pub fn stage_focus(&self, stage: StageType) -> Vec<String> {
        self.stage_competency_focus
            .get(stage.as_str())
            .cloned()
            .unwrap_or_else(|| vec!["technical_depth".to_string(), "communication".to_string()])
    }

    /// Human-readable rubric level for a competency score
    ///
    /// Falls back to the default 85/70/50 bands when the competency defines
    /// no rubric or the score falls outside all configured ranges.
    pub fn rubric_level(&self, competency: &str, score: f64) -> String {
        if let Some(definition) = self.competencies.get(competency) {
            for (range, level) in &definition.rubric {
                if let Some((low, high)) = parse_range(range) {
                    if score >= low && score <= high {
                        return level.clone();
                    }
                }
            }
        }

        if score >= 85.0 {
            "Exceptional - Top performer".to_string()
        } else if score >= 70.0 {
            "Strong - Above expectations".to_string()
        } else if score >= 50.0 {
            "Adequate - Meets expectations".to_string()
        } else {
            "Needs Development - Below expectations".to_string()
        }
    }

    /// Definition lookup with an anonymous fallback
    pub fn competency_definition(&self, competency: &str) -> CompetencyDefinition {
        self.competencies
            .get(competency)
            .cloned()
            .unwrap_or_else(|| CompetencyDefinition {
                name: competency.to_string(),
                ..Default::default()
            })
    }
}

fn parse_range(range: &str) -> Option<(f64, f64)> {
    let (low, high) = range.split_once('-')?;
    Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
}

fn default_weights() -> HashMap<String, f64> {
    HashMap::from([
        ("technical_depth".to_string(), 0.35),
        ("communication".to_string(), 0.20),
        ("problem_solving".to_string(), 0.30),
        ("leadership".to_string(), 0.15),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> CompetenciesConfig {
        serde_yaml::from_str(
            r#"
competencies:
  technical_depth:
    name: "Technical Depth"
    description: "Depth of technical knowledge"
    dimensions: [algorithms, system_design]
    rubric:
      "0-49": "Below bar"
      "50-79": "Solid"
      "80-100": "Outstanding"
dimension_competency_map:
  algorithms: technical_depth
  system_design: technical_depth
  clarity: communication
role_competency_weights:
  "Backend Developer":
    technical_depth: 0.5
    problem_solving: 0.3
    communication: 0.2
  default:
    technical_depth: 0.35
    communication: 0.20
    problem_solving: 0.30
    leadership: 0.15
stage_competency_focus:
  technical: [technical_depth, problem_solving]
  hr: [communication, adaptability]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_map_dimension() {
        let config = sample_config();
        assert_eq!(config.map_dimension("algorithms"), "technical_depth");
        assert_eq!(config.map_dimension("clarity"), "communication");
        assert_eq!(config.map_dimension("unknown"), "general");
    }

    #[test]
    fn test_role_weights_exact_match() {
        let config = sample_config();
        let weights = config.role_weights("Backend Developer");
        assert_eq!(weights["technical_depth"], 0.5);
    }

    #[test]
    fn test_role_weights_substring_match() {
        let config = sample_config();
        let weights = config.role_weights("Senior Backend Developer (Platform)");
        assert_eq!(weights["technical_depth"], 0.5);
    }

    #[test]
    fn test_role_weights_default() {
        let config = sample_config();
        let weights = config.role_weights("Pastry Chef");
        assert_eq!(weights["technical_depth"], 0.35);
        assert_eq!(weights["leadership"], 0.15);
    }

    #[test]
    fn test_role_weights_empty_config() {
        let config = CompetenciesConfig::default();
        let weights = config.role_weights("Anyone");
        let total: f64 = weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stage_focus() {
        let config = sample_config();
        assert_eq!(
            config.stage_focus(StageType::Technical),
            vec!["technical_depth", "problem_solving"]
        );
        // Unconfigured stage gets the default focus
        assert_eq!(
            config.stage_focus(StageType::Behavioral),
            vec!["technical_depth", "communication"]
        );
    }

    #[test]
    fn test_rubric_level_configured() {
        let config = sample_config();
        assert_eq!(config.rubric_level("technical_depth", 60.0), "Solid");
        assert_eq!(config.rubric_level("technical_depth", 85.0), "Outstanding");
    }

    #[test]
    fn test_rubric_level_default_bands() {
        let config = sample_config();
        assert_eq!(
            config.rubric_level("communication", 90.0),
            "Exceptional - Top performer"
        );
        assert_eq!(
            config.rubric_level("communication", 72.0),
            "Strong - Above expectations"
        );
        assert_eq!(
            config.rubric_level("communication", 55.0),
            "Adequate - Meets expectations"
        );
        assert_eq!(
            config.rubric_level("communication", 30.0),
            "Needs Development - Below expectations"
        );
    }
}
