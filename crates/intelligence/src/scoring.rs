//! Answer scoring engine
//!
//! Scores candidate answers in real time across multiple dimensions using
//! the fast shadow model. Scoring never fails: short answers get a fixed
//! low score without a model call, and any model or parse failure yields a
//! neutral score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use interview_agent_core::StageType;
use interview_agent_llm::LanguageModel;

const SHORT_ANSWER_CHARS: usize = 10;
const ANSWER_EXCERPT_CHARS: usize = 2_000;
const TREND_BAND: f64 = 5.0;

/// Detailed scoring result for one candidate answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerScore {
    /// Overall score (0-100)
    pub overall: f64,
    /// Did they answer the question? (0-100)
    pub relevance: f64,
    /// How substantive and detailed? (0-100)
    pub depth: f64,
    /// Are claims technically correct? (0-100)
    pub technical_accuracy: f64,
    /// Clear and structured? (0-100)
    pub communication: f64,
    /// Primary competency dimension tested
    pub dimension: String,
    /// Brief explanation of the score
    pub feedback: String,
    /// Should the interviewer dig deeper?
    pub follow_up_needed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_follow_up: Option<String>,
    /// Model confidence in this scoring (0-1)
    pub confidence: f64,
}

impl AnswerScore {
    /// Fixed low score for empty or near-empty answers
    fn too_short() -> Self {
        Self {
            overall: 20.0,
            relevance: 10.0,
            depth: 10.0,
            technical_accuracy: 50.0,
            communication: 30.0,
            dimension: "communication".to_string(),
            feedback: "Answer was too brief or empty".to_string(),
            follow_up_needed: true,
            suggested_follow_up: Some("Could you elaborate on that?".to_string()),
            confidence: 0.9,
        }
    }

    /// Neutral score used when the model fails
    fn neutral() -> Self {
        Self {
            overall: 50.0,
            relevance: 50.0,
            depth: 50.0,
            technical_accuracy: 50.0,
            communication: 50.0,
            dimension: "general".to_string(),
            feedback: "Unable to score (system error)".to_string(),
            follow_up_needed: false,
            suggested_follow_up: None,
            confidence: 0.0,
        }
    }
}

/// Performance trend over a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Aggregate statistics over a session's answer scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub overall_avg: f64,
    pub dimension_scores: std::collections::BTreeMap<String, f64>,
    pub communication_avg: f64,
    pub trend: ScoreTrend,
    pub sample_size: usize,
    pub high_scores: usize,
    pub low_scores: usize,
}

/// Additional context for scoring
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    pub profile_context: Option<String>,
    pub previous_scores: Vec<f64>,
}

/// Real-time answer scoring via the shadow model
pub struct ScoringEngine {
    llm: Arc<dyn LanguageModel>,
}

impl ScoringEngine {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Score a candidate answer; never raises
    ///
    /// Answers under 10 trimmed characters get a fixed low score without a
    /// model call. Model or parse failures return the neutral score.
    pub async fn score_answer(
        &self,
        question: &str,
        answer: &str,
        stage_type: StageType,
        job_role: &str,
        context: Option<&ScoreContext>,
    ) -> AnswerScore {
        if answer.trim().chars().count() < SHORT_ANSWER_CHARS {
            return AnswerScore::too_short();
        }

        let prompt = self.build_prompt(question, answer, stage_type, job_role, context);

        match self.llm.generate_json(&prompt).await {
            Ok(data) => Self::parse_score(&data),
            Err(e) => {
                tracing::error!(error = %e, "Scoring failed");
                AnswerScore::neutral()
            }
        }
    }

    fn build_prompt(
        &self,
        question: &str,
        answer: &str,
        stage_type: StageType,
        job_role: &str,
        context: Option<&ScoreContext>,
    ) -> String {
        let mut context_str = String::new();
        if let Some(context) = context {
            if let Some(profile) = &context.profile_context {
                context_str.push_str(&format!("Candidate Profile: {profile}\n"));
            }
            if !context.previous_scores.is_empty() {
                let avg: f64 = context.previous_scores.iter().sum::<f64>()
                    / context.previous_scores.len() as f64;
                context_str.push_str(&format!("Average score so far: {avg:.1}/100\n"));
            }
        }
        if context_str.is_empty() {
            context_str.push_str("None");
        }

        let answer_excerpt: String = answer.chars().take(ANSWER_EXCERPT_CHARS).collect();

        format!(
            r#"You are an expert interview evaluator. Score this answer objectively.

**Interview Context:**
- Stage: {stage_type}
- Target Role: {job_role}

**Question Asked:**
{question}

**Candidate's Answer:**
{answer_excerpt}

**Additional Context:**
{context_str}

Evaluate on these dimensions (0-100 scale):
1. **Relevance**: Did they directly answer the question asked?
2. **Depth**: How substantive and detailed was the response?
3. **Technical Accuracy**: Are claims and statements technically correct? (N/A if non-technical)
4. **Communication**: Was the answer clear, structured, and concise?

Determine the PRIMARY competency dimension being tested:
- technical_depth (algorithms, system_design, code_quality, architecture)
- communication (clarity, structure, articulation)
- problem_solving (analysis, methodology, edge_cases)
- leadership (influence, decision_making, conflict_resolution)
- adaptability (learning, flexibility, growth_mindset)

Return JSON:
{{
    "overall": 75,
    "relevance": 80,
    "depth": 70,
    "technical_accuracy": 75,
    "communication": 80,
    "dimension": "technical_depth",
    "feedback": "Good high-level answer but lacked specific implementation details",
    "follow_up_needed": true,
    "suggested_follow_up": "Ask how they would handle failure scenarios",
    "confidence": 0.85
}}

Be objective. A score of 50 is average. Below 40 is weak. Above 80 is strong."#
        )
    }

    fn parse_score(data: &Value) -> AnswerScore {
        let number = |field: &str| data.get(field).and_then(|v| v.as_f64()).unwrap_or(50.0);

        AnswerScore {
            overall: number("overall"),
            relevance: number("relevance"),
            depth: number("depth"),
            technical_accuracy: number("technical_accuracy"),
            communication: number("communication"),
            dimension: data
                .get("dimension")
                .and_then(|v| v.as_str())
                .unwrap_or("general")
                .to_string(),
            feedback: data
                .get("feedback")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            follow_up_needed: data
                .get("follow_up_needed")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            suggested_follow_up: data
                .get("suggested_follow_up")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            confidence: data.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.7),
        }
    }

    /// Aggregate statistics over the session's scores
    pub fn compute_aggregate(scores: &[AnswerScore]) -> AggregateStats {
        if scores.is_empty() {
            return AggregateStats {
                overall_avg: 0.0,
                dimension_scores: Default::default(),
                communication_avg: 0.0,
                trend: ScoreTrend::InsufficientData,
                sample_size: 0,
                high_scores: 0,
                low_scores: 0,
            };
        }

        let overall_avg = scores.iter().map(|s| s.overall).sum::<f64>() / scores.len() as f64;
        let communication_avg =
            scores.iter().map(|s| s.communication).sum::<f64>() / scores.len() as f64;

        let mut by_dimension: std::collections::BTreeMap<String, Vec<f64>> = Default::default();
        for score in scores {
            by_dimension
                .entry(score.dimension.clone())
                .or_default()
                .push(score.overall);
        }
        let dimension_scores = by_dimension
            .into_iter()
            .map(|(dim, vals)| {
                let avg = vals.iter().sum::<f64>() / vals.len() as f64;
                (dim, (avg * 10.0).round() / 10.0)
            })
            .collect();

        let trend = if scores.len() >= 3 {
            let mid = scores.len() / 2;
            let first: f64 =
                scores[..mid].iter().map(|s| s.overall).sum::<f64>() / mid.max(1) as f64;
            let second: f64 = scores[mid..].iter().map(|s| s.overall).sum::<f64>()
                / (scores.len() - mid) as f64;
            if second > first + TREND_BAND {
                ScoreTrend::Improving
            } else if second < first - TREND_BAND {
                ScoreTrend::Declining
            } else {
                ScoreTrend::Stable
            }
        } else {
            ScoreTrend::InsufficientData
        };

        AggregateStats {
            overall_avg: (overall_avg * 10.0).round() / 10.0,
            dimension_scores,
            communication_avg: (communication_avg * 10.0).round() / 10.0,
            trend,
            sample_size: scores.len(),
            high_scores: scores.iter().filter(|s| s.overall >= 80.0).count(),
            low_scores: scores.iter().filter(|s| s.overall < 50.0).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_llm::StaticLlm;

    fn scored(overall: f64, dimension: &str) -> AnswerScore {
        AnswerScore {
            overall,
            relevance: overall,
            depth: overall,
            technical_accuracy: overall,
            communication: overall,
            dimension: dimension.to_string(),
            feedback: String::new(),
            follow_up_needed: false,
            suggested_follow_up: None,
            confidence: 0.8,
        }
    }

    #[tokio::test]
    async fn test_blank_answer_skips_llm() {
        let llm = StaticLlm::new();
        let engine = ScoringEngine::new(Arc::new(llm.clone()));

        let score = engine
            .score_answer("Q?", "  ", StageType::Technical, "Dev", None)
            .await;

        assert_eq!(score.overall, 20.0);
        assert_eq!(score.relevance, 10.0);
        assert_eq!(score.depth, 10.0);
        assert_eq!(score.communication, 30.0);
        assert_eq!(score.technical_accuracy, 50.0);
        assert_eq!(score.dimension, "communication");
        assert!(score.follow_up_needed);
        assert_eq!(score.confidence, 0.9);
        // The model must not have been called
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scores_parsed_from_model() {
        let llm = StaticLlm::with_responses(vec![r#"{
            "overall": 82, "relevance": 85, "depth": 78,
            "technical_accuracy": 88, "communication": 80,
            "dimension": "technical_depth",
            "feedback": "Strong grasp of internals",
            "follow_up_needed": true,
            "suggested_follow_up": "Ask about failure modes",
            "confidence": 0.9
        }"#
        .to_string()]);
        let engine = ScoringEngine::new(Arc::new(llm));

        let score = engine
            .score_answer(
                "How does tokio schedule tasks?",
                "Tokio uses a work-stealing scheduler with per-worker run queues and a global injector queue.",
                StageType::Technical,
                "Backend Developer",
                None,
            )
            .await;

        assert_eq!(score.overall, 82.0);
        assert_eq!(score.dimension, "technical_depth");
        assert!(score.follow_up_needed);
        assert_eq!(score.suggested_follow_up.as_deref(), Some("Ask about failure modes"));
    }

    #[tokio::test]
    async fn test_model_failure_yields_neutral() {
        let llm = StaticLlm::failing("transport down");
        let engine = ScoringEngine::new(Arc::new(llm));

        let score = engine
            .score_answer(
                "Q?",
                "A perfectly reasonable answer with enough length.",
                StageType::Hr,
                "General",
                None,
            )
            .await;

        assert_eq!(score.overall, 50.0);
        assert_eq!(score.relevance, 50.0);
        assert_eq!(score.depth, 50.0);
        assert_eq!(score.technical_accuracy, 50.0);
        assert_eq!(score.communication, 50.0);
        assert_eq!(score.confidence, 0.0);
        assert!(!score.follow_up_needed);
    }

    #[tokio::test]
    async fn test_malformed_output_yields_neutral() {
        let llm = StaticLlm::with_responses(vec!["definitely not json".to_string()]);
        let engine = ScoringEngine::new(Arc::new(llm));

        let score = engine
            .score_answer("Q?", "A reasonable answer, long enough.", StageType::Hr, "General", None)
            .await;
        assert_eq!(score.confidence, 0.0);
        assert_eq!(score.overall, 50.0);
    }

    #[test]
    fn test_aggregate_trend_improving() {
        let scores = vec![
            scored(40.0, "communication"),
            scored(45.0, "communication"),
            scored(70.0, "technical_depth"),
            scored(80.0, "technical_depth"),
        ];
        let stats = ScoringEngine::compute_aggregate(&scores);
        assert_eq!(stats.trend, ScoreTrend::Improving);
        assert_eq!(stats.sample_size, 4);
        assert_eq!(stats.high_scores, 1);
        assert_eq!(stats.low_scores, 2);
        assert_eq!(stats.dimension_scores["technical_depth"], 75.0);
    }

    #[test]
    fn test_aggregate_trend_stable_within_band() {
        let scores = vec![scored(60.0, "a"), scored(62.0, "a"), scored(63.0, "a")];
        let stats = ScoringEngine::compute_aggregate(&scores);
        assert_eq!(stats.trend, ScoreTrend::Stable);
    }

    #[test]
    fn test_aggregate_insufficient_data() {
        let stats = ScoringEngine::compute_aggregate(&[scored(90.0, "a"), scored(10.0, "b")]);
        assert_eq!(stats.trend, ScoreTrend::InsufficientData);

        let empty = ScoringEngine::compute_aggregate(&[]);
        assert_eq!(empty.sample_size, 0);
        assert_eq!(empty.trend, ScoreTrend::InsufficientData);
    }

    #[test]
    fn test_score_serde_roundtrip() {
        let score = scored(73.5, "problem_solving");
        let json = serde_json::to_string(&score).unwrap();
        let back: AnswerScore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, score);
    }
}
