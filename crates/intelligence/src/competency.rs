//! Competency evaluation
//!
//! Rolls per-turn dimension scores up into competency scores with rubric
//! levels, and computes the role-weighted fit score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use interview_agent_config::CompetenciesConfig;
use interview_agent_core::StageType;

/// Per-turn score with its tested dimension, as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnScoreRecord {
    pub turn: u32,
    pub score: f64,
    pub dimension: String,
    #[serde(default)]
    pub feedback: String,
}

/// Score for a single competency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyScore {
    pub score: f64,
    pub rubric_level: String,
    pub sample_size: usize,
    /// Turn references backing this competency (capped)
    pub evidence: Vec<String>,
}

/// Full competency evaluation for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyReport {
    pub competency_scores: BTreeMap<String, CompetencyScore>,
    pub role_fit_score: f64,
    pub role_weights_used: BTreeMap<String, f64>,
    pub summary: String,
}

/// Evaluates performance against the competency framework
pub struct CompetencyEvaluator {
    config: CompetenciesConfig,
}

impl CompetencyEvaluator {
    pub fn new(config: CompetenciesConfig) -> Self {
        Self { config }
    }

    /// Compute final competency scores from per-turn assessments
    ///
    /// Scores group by mapped competency and average; the role-fit score is
    /// the weighted mean, substituting 50 for weighted competencies with no
    /// samples.
    pub fn compute_competency_scores(
        &self,
        turn_scores: &[TurnScoreRecord],
        job_role: &str,
    ) -> CompetencyReport {
        if turn_scores.is_empty() {
            return CompetencyReport {
                competency_scores: BTreeMap::new(),
                role_fit_score: 0.0,
                role_weights_used: BTreeMap::new(),
                summary: "No scoring data available".to_string(),
            };
        }

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut evidence: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for turn in turn_scores {
            let competency = self.config.map_dimension(&turn.dimension).to_string();
            grouped.entry(competency.clone()).or_default().push(turn.score);
            evidence
                .entry(competency)
                .or_default()
                .push(format!("Turn {}", turn.turn));
        }

        let mut competency_scores = BTreeMap::new();
        for (competency, scores) in &grouped {
            let avg = scores.iter().sum::<f64>() / scores.len() as f64;
            let avg = (avg * 10.0).round() / 10.0;
            competency_scores.insert(
                competency.clone(),
                CompetencyScore {
                    score: avg,
                    rubric_level: self.config.rubric_level(competency, avg),
                    sample_size: scores.len(),
                    evidence: evidence[competency].iter().take(5).cloned().collect(),
                },
            );
        }

        let weights: BTreeMap<String, f64> =
            self.config.role_weights(job_role).into_iter().collect();

        let mut role_fit = 0.0;
        let mut weight_sum = 0.0;
        for (competency, weight) in &weights {
            let score = competency_scores
                .get(competency)
                .map(|c| c.score)
                .unwrap_or(50.0);
            role_fit += score * weight;
            weight_sum += weight;
        }
        let role_fit_score = if weight_sum > 0.0 {
            (role_fit / weight_sum * 10.0).round() / 10.0
        } else {
            50.0
        };

        let summary = self.summarize(&competency_scores, role_fit_score, job_role);

        CompetencyReport {
            competency_scores,
            role_fit_score,
            role_weights_used: weights,
            summary,
        }
    }

    fn summarize(
        &self,
        results: &BTreeMap<String, CompetencyScore>,
        role_fit: f64,
        job_role: &str,
    ) -> String {
        if results.is_empty() {
            return "Insufficient data for evaluation".to_string();
        }

        let strengths: Vec<&str> = results
            .iter()
            .filter(|(_, c)| c.score >= 70.0)
            .map(|(name, _)| name.as_str())
            .collect();
        let development: Vec<&str> = results
            .iter()
            .filter(|(_, c)| c.score < 50.0)
            .map(|(name, _)| name.as_str())
            .collect();

        let mut parts = Vec::new();
        if role_fit >= 75.0 {
            parts.push(format!("Strong fit for {job_role} role ({role_fit:.0}%)"));
        } else if role_fit >= 60.0 {
            parts.push(format!("Moderate fit for {job_role} role ({role_fit:.0}%)"));
        } else {
            parts.push(format!("Below target for {job_role} role ({role_fit:.0}%)"));
        }

        if !strengths.is_empty() {
            parts.push(format!("Strengths: {}", strengths.join(", ")));
        }
        if !development.is_empty() {
            parts.push(format!("Development areas: {}", development.join(", ")));
        }

        format!("{}.", parts.join(". "))
    }

    /// Competencies prioritized for a stage
    pub fn stage_focus(&self, stage_type: StageType) -> Vec<String> {
        self.config.stage_focus(stage_type)
    }

    /// Interviewer guidance for the stage's competency focus
    pub fn interview_guidance(
        &self,
        stage_type: StageType,
        job_role: &str,
        current_scores: Option<&BTreeMap<String, f64>>,
    ) -> String {
        let focus = self.config.stage_focus(stage_type);
        let weights = self.config.role_weights(job_role);

        let mut lines = vec![format!(
            "COMPETENCY FOCUS for {} stage:",
            stage_type.as_str().to_uppercase()
        )];

        for competency in &focus {
            let details = self.config.competency_definition(competency);
            let weight = weights.get(competency).copied().unwrap_or(0.0);
            lines.push(format!(
                "- {} (weight: {:.0}%): {}",
                if details.name.is_empty() {
                    competency.clone()
                } else {
                    details.name
                },
                weight * 100.0,
                details.description
            ));
        }

        if let Some(current) = current_scores {
            let weak: Vec<&str> = current
                .iter()
                .filter(|(comp, score)| **score < 50.0 && focus.contains(comp))
                .map(|(comp, _)| comp.as_str())
                .collect();
            if !weak.is_empty() {
                lines.push(String::new());
                lines.push(format!(
                    "PRIORITY: Probe deeper on {} (currently weak)",
                    weak.join(", ")
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompetenciesConfig {
        serde_yaml::from_str(
            r#"
competencies:
  technical_depth:
    name: "Technical Depth"
    description: "Depth of technical knowledge"
  communication:
    name: "Communication"
    description: "Clarity and structure"
dimension_competency_map:
  technical_depth: technical_depth
  system_design: technical_depth
  communication: communication
role_competency_weights:
  default:
    technical_depth: 0.5
    communication: 0.5
stage_competency_focus:
  technical: [technical_depth]
"#,
        )
        .unwrap()
    }

    fn record(turn: u32, score: f64, dimension: &str) -> TurnScoreRecord {
        TurnScoreRecord {
            turn,
            score,
            dimension: dimension.to_string(),
            feedback: String::new(),
        }
    }

    #[test]
    fn test_empty_scores() {
        let evaluator = CompetencyEvaluator::new(config());
        let report = evaluator.compute_competency_scores(&[], "Backend Developer");
        assert!(report.competency_scores.is_empty());
        assert_eq!(report.role_fit_score, 0.0);
        assert_eq!(report.summary, "No scoring data available");
    }

    #[test]
    fn test_grouping_and_means() {
        let evaluator = CompetencyEvaluator::new(config());
        let report = evaluator.compute_competency_scores(
            &[
                record(1, 80.0, "technical_depth"),
                record(2, 90.0, "system_design"),
                record(3, 60.0, "communication"),
            ],
            "Backend Developer",
        );

        let technical = &report.competency_scores["technical_depth"];
        assert_eq!(technical.score, 85.0);
        assert_eq!(technical.sample_size, 2);
        assert_eq!(technical.evidence, vec!["Turn 1", "Turn 2"]);

        // Weighted mean of 85 and 60
        assert_eq!(report.role_fit_score, 72.5);
    }

    #[test]
    fn test_missing_competency_substitutes_neutral() {
        let evaluator = CompetencyEvaluator::new(config());
        let report = evaluator
            .compute_competency_scores(&[record(1, 90.0, "technical_depth")], "Backend Developer");

        // Communication had no samples: (90*0.5 + 50*0.5)
        assert_eq!(report.role_fit_score, 70.0);
    }

    #[test]
    fn test_unmapped_dimension_goes_to_general() {
        let evaluator = CompetencyEvaluator::new(config());
        let report =
            evaluator.compute_competency_scores(&[record(1, 75.0, "juggling")], "Backend Developer");
        assert!(report.competency_scores.contains_key("general"));
    }

    #[test]
    fn test_summary_bands() {
        let evaluator = CompetencyEvaluator::new(config());

        let strong = evaluator.compute_competency_scores(
            &[record(1, 90.0, "technical_depth"), record(2, 85.0, "communication")],
            "Backend Developer",
        );
        assert!(strong.summary.starts_with("Strong fit"));
        assert!(strong.summary.contains("Strengths:"));

        let weak = evaluator.compute_competency_scores(
            &[record(1, 30.0, "technical_depth"), record(2, 35.0, "communication")],
            "Backend Developer",
        );
        assert!(weak.summary.starts_with("Below target"));
        assert!(weak.summary.contains("Development areas:"));
    }

    #[test]
    fn test_interview_guidance() {
        let evaluator = CompetencyEvaluator::new(config());
        let guidance = evaluator.interview_guidance(StageType::Technical, "Backend Developer", None);
        assert!(guidance.contains("COMPETENCY FOCUS for TECHNICAL stage:"));
        assert!(guidance.contains("Technical Depth"));
        assert!(guidance.contains("50%"));

        let mut current = BTreeMap::new();
        current.insert("technical_depth".to_string(), 40.0);
        let with_priority =
            evaluator.interview_guidance(StageType::Technical, "Backend Developer", Some(&current));
        assert!(with_priority.contains("PRIORITY: Probe deeper on technical_depth"));
    }
}
