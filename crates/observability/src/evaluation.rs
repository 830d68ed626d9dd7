//! Post-session evaluation
//!
//! LLM-as-a-judge (GEval) over the full transcript plus cheap transcript
//! statistics. GEval output is advisory: raw scores are stored with the
//! model used, and a failed evaluation produces no result rather than a bad
//! one.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use interview_agent_core::{StageType, Transcript, TurnRole};
use interview_agent_llm::LanguageModel;

use crate::models::{EvaluationResult, EvaluationScore};
use crate::service::ObservabilityService;

const GEVAL_METRICS: [&str; 4] = ["confidence", "clarity", "relevance", "depth"];

/// Engine for post-session evaluation metrics
pub struct EvaluationEngine {
    llm: Arc<dyn LanguageModel>,
}

impl EvaluationEngine {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Basic transcript statistics, suitable for metric recording
    pub fn basic_metrics(&self, transcript: &Transcript) -> HashMap<String, f64> {
        if transcript.is_empty() {
            return HashMap::new();
        }

        let user_turns: Vec<_> = transcript
            .turns()
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .collect();
        let assistant_turns: Vec<_> = transcript
            .turns()
            .iter()
            .filter(|t| t.role == TurnRole::Assistant)
            .collect();

        let user_words: usize = user_turns.iter().map(|t| t.word_count()).sum();
        let assistant_words: usize = assistant_turns.iter().map(|t| t.word_count()).sum();

        let mut metrics = HashMap::new();
        metrics.insert("total_turns".to_string(), transcript.len() as f64);
        metrics.insert("user_turns".to_string(), user_turns.len() as f64);
        metrics.insert("assistant_turns".to_string(), assistant_turns.len() as f64);
        metrics.insert("user_total_words".to_string(), user_words as f64);
        metrics.insert("assistant_total_words".to_string(), assistant_words as f64);
        metrics.insert(
            "avg_user_words_per_turn".to_string(),
            if user_turns.is_empty() {
                0.0
            } else {
                user_words as f64 / user_turns.len() as f64
            },
        );
        metrics.insert(
            "conversation_ratio".to_string(),
            if assistant_words > 0 {
                user_words as f64 / assistant_words as f64
            } else {
                0.0
            },
        );
        metrics
    }

    /// Run GEval over a complete session transcript
    ///
    /// Returns `None` for transcripts under two turns and on any model or
    /// parse failure.
    pub async fn evaluate_session(
        &self,
        session_id: &str,
        transcript: &Transcript,
        stage_type: StageType,
        job_role: &str,
        trace_id: Option<String>,
    ) -> Option<EvaluationResult> {
        if transcript.len() < 2 {
            tracing::warn!(
                turns = transcript.len(),
                "Insufficient transcript for evaluation"
            );
            return None;
        }

        let prompt = self.build_prompt(transcript, stage_type, job_role);

        let data = match self.llm.generate_json(&prompt).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "GEval evaluation failed");
                return None;
            }
        };

        let scores = GEVAL_METRICS
            .iter()
            .map(|metric| EvaluationScore {
                metric_name: metric.to_string(),
                score: score_field(&data, metric),
                reason: data
                    .get(format!("{metric}_reason"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            })
            .collect();

        let mut evaluation = EvaluationResult::new(session_id, "geval");
        evaluation.trace_id = trace_id;
        evaluation.scores = scores;
        evaluation.overall_score = Some(score_field(&data, "overall_score"));
        evaluation.summary = data
            .get("overall_summary")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        evaluation.metadata = HashMap::from([
            ("stage_type".to_string(), json!(stage_type.as_str())),
            ("job_role".to_string(), json!(job_role)),
            ("transcript_turns".to_string(), json!(transcript.len())),
            ("model".to_string(), json!(self.llm.model_name())),
        ]);

        tracing::info!(
            session_id,
            overall = evaluation.overall_score,
            "GEval completed"
        );
        Some(evaluation)
    }

    /// Run GEval and submit the result to the observability service
    pub async fn evaluate_and_submit(
        &self,
        service: &ObservabilityService,
        session_id: &str,
        transcript: &Transcript,
        stage_type: StageType,
        job_role: &str,
    ) -> Option<EvaluationResult> {
        let trace_id = service.trace_for_session(session_id);
        let evaluation = self
            .evaluate_session(session_id, transcript, stage_type, job_role, trace_id)
            .await?;
        service.submit_evaluation(&evaluation).await;
        Some(evaluation)
    }

    fn build_prompt(&self, transcript: &Transcript, stage_type: StageType, job_role: &str) -> String {
        let transcript_text = transcript
            .turns()
            .iter()
            .map(|t| {
                let speaker = match t.role {
                    TurnRole::Assistant => "Interviewer",
                    TurnRole::User => "Candidate",
                };
                format!("{speaker}: {}", t.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are an expert interview evaluator. Analyze this interview transcript and provide scores.

Interview Context:
- Stage: {stage_type}
- Target Role: {job_role}

Transcript:
{transcript_text}

Evaluate the CANDIDATE's performance on these criteria (score 0.0 to 1.0):

1. **Confidence** (0-1): How confident did the candidate appear?
2. **Clarity** (0-1): How clearly did the candidate communicate?
3. **Relevance** (0-1): How relevant were the answers to the questions?
4. **Depth** (0-1): How substantive were the responses?

Return JSON only (no markdown):
{{
    "confidence": 0.75,
    "confidence_reason": "Brief explanation",
    "clarity": 0.80,
    "clarity_reason": "Brief explanation",
    "relevance": 0.85,
    "relevance_reason": "Brief explanation",
    "depth": 0.70,
    "depth_reason": "Brief explanation",
    "overall_summary": "2-3 sentence overall assessment",
    "overall_score": 0.77
}}"#
        )
    }
}

fn score_field(data: &Value, field: &str) -> f64 {
    data.get(field).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_core::Turn;
    use interview_agent_llm::StaticLlm;

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.push(Turn::assistant("Tell me about a project you led."));
        t.push(Turn::user("I led the migration of our billing service to an event-driven design."));
        t
    }

    #[tokio::test]
    async fn test_geval_parses_scores() {
        let llm = StaticLlm::with_responses(vec![r#"```json
{
    "confidence": 0.7,
    "confidence_reason": "Steady answers",
    "clarity": 0.8,
    "clarity_reason": "Well structured",
    "relevance": 0.9,
    "relevance_reason": "On topic",
    "depth": 0.6,
    "depth_reason": "Some detail",
    "overall_summary": "Solid candidate.",
    "overall_score": 0.75
}
```"#
            .to_string()]);

        let engine = EvaluationEngine::new(Arc::new(llm));
        let result = engine
            .evaluate_session("s1", &transcript(), StageType::Technical, "Backend Developer", Some("t1".to_string()))
            .await
            .unwrap();

        assert_eq!(result.evaluator, "geval");
        assert_eq!(result.trace_id.as_deref(), Some("t1"));
        assert_eq!(result.scores.len(), 4);
        assert_eq!(result.overall_score, Some(0.75));
        let clarity = result.scores.iter().find(|s| s.metric_name == "clarity").unwrap();
        assert_eq!(clarity.score, 0.8);
        assert_eq!(clarity.reason.as_deref(), Some("Well structured"));
    }

    #[tokio::test]
    async fn test_geval_requires_two_turns() {
        let llm = StaticLlm::new();
        let engine = EvaluationEngine::new(Arc::new(llm.clone()));
        let mut short = Transcript::new();
        short.push(Turn::assistant("Hello"));

        assert!(engine
            .evaluate_session("s1", &short, StageType::Hr, "General", None)
            .await
            .is_none());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_geval_failure_yields_none() {
        let llm = StaticLlm::failing("model unavailable");
        let engine = EvaluationEngine::new(Arc::new(llm));
        assert!(engine
            .evaluate_session("s1", &transcript(), StageType::Hr, "General", None)
            .await
            .is_none());
    }

    #[test]
    fn test_basic_metrics() {
        let llm = StaticLlm::new();
        let engine = EvaluationEngine::new(Arc::new(llm));
        let metrics = engine.basic_metrics(&transcript());
        assert_eq!(metrics["total_turns"], 2.0);
        assert_eq!(metrics["user_turns"], 1.0);
        assert!(metrics["conversation_ratio"] > 0.0);
    }
}
