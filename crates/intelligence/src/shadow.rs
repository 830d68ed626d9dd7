//! Shadow monitor
//!
//! Background intelligence that watches the interview loop with the fast
//! model and may produce a runtime directive for the interviewer. Runs as a
//! detached task; its outcome applies to subsequent turns only, and any
//! failure means no intervention.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use interview_agent_core::{StageType, Transcript};
use interview_agent_llm::LanguageModel;
use interview_agent_observability::ObservabilityService;

const MIN_TRANSCRIPT_TURNS: usize = 2;
const ANALYSIS_WINDOW_TURNS: usize = 6;

/// Background conversation monitor
pub struct ShadowMonitor {
    llm: Arc<dyn LanguageModel>,
    observability: Arc<ObservabilityService>,
}

impl ShadowMonitor {
    pub fn new(llm: Arc<dyn LanguageModel>, observability: Arc<ObservabilityService>) -> Self {
        Self { llm, observability }
    }

    /// Analyze recent turns and return an intervention directive if needed
    ///
    /// Returns `None` when the conversation is flowing, when the transcript
    /// is too short, and on any error.
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        job_role: &str,
        stage_type: StageType,
        session_id: &str,
    ) -> Option<String> {
        if transcript.len() < MIN_TRANSCRIPT_TURNS {
            return None;
        }

        let recent = transcript.recent(ANALYSIS_WINDOW_TURNS);
        let transcript_text = recent
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"You are a silent interview coach observing a live {stage_type} interview for a {job_role} role.

Recent conversation:
{transcript_text}

Assess the flow. Possible statuses:
- "flowing": conversation is healthy, no action needed
- "stuck": candidate is blocked or silent, interviewer should help
- "rambling": candidate is off-topic or monologuing, interviewer should refocus
- "too_easy": candidate is breezing through, interviewer should push harder
- "tense": candidate is stressed, interviewer should ease off

Return JSON:
{{
    "status": "flowing",
    "intervention": null
}}

If status is not "flowing", set "intervention" to ONE short directive for the interviewer
(e.g. "Offer a hint." or "Politely refocus on the question.")."#
        );

        // Background tasks do not inherit task-local context; the registry
        // keyed by session_id is the reliable path to the trace.
        let trace_id = self.observability.trace_for_session(session_id);

        let start = Instant::now();
        let data = match self.llm.generate_json(&prompt).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Shadow monitor analysis failed");
                return None;
            }
        };
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = data
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("flowing")
            .to_string();
        let intervention = data
            .get("intervention")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        self.observability
            .log_llm_call(
                trace_id.as_deref(),
                self.llm.model_name(),
                &prompt,
                &data.to_string(),
                Some(HashMap::from([
                    ("component".to_string(), json!("shadow_monitor")),
                    ("status".to_string(), json!(status)),
                    ("has_intervention".to_string(), json!(intervention.is_some())),
                ])),
                Some(latency_ms),
                None,
            )
            .await;

        if status != "flowing" {
            if let Some(intervention) = intervention {
                tracing::info!(status = %status, intervention = %intervention, "Shadow monitor intervention");
                self.observability
                    .record_metric(
                        "shadow_intervention",
                        1.0,
                        trace_id.as_deref(),
                        Some(HashMap::from([
                            ("status".to_string(), json!(status)),
                            (
                                "intervention_text".to_string(),
                                json!(intervention.chars().take(200).collect::<String>()),
                            ),
                            ("turn_count".to_string(), json!(transcript.len())),
                        ])),
                    )
                    .await;
                return Some(intervention);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_core::Turn;
    use interview_agent_llm::StaticLlm;

    fn transcript(turns: usize) -> Transcript {
        let mut t = Transcript::new();
        for i in 0..turns {
            if i % 2 == 0 {
                t.push(Turn::assistant(format!("Question {i}")));
            } else {
                t.push(Turn::user(format!("Answer {i}")));
            }
        }
        t
    }

    fn monitor(llm: StaticLlm) -> ShadowMonitor {
        ShadowMonitor::new(Arc::new(llm), Arc::new(ObservabilityService::disabled()))
    }

    #[tokio::test]
    async fn test_short_transcript_skips_analysis() {
        let llm = StaticLlm::new();
        let monitor = monitor(llm.clone());
        assert!(monitor
            .analyze(&transcript(1), "Dev", StageType::Technical, "s1")
            .await
            .is_none());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_flowing_yields_no_intervention() {
        let llm = StaticLlm::with_responses(vec![
            r#"{"status": "flowing", "intervention": null}"#.to_string()
        ]);
        let monitor = monitor(llm);
        assert!(monitor
            .analyze(&transcript(4), "Dev", StageType::Technical, "s1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_stuck_yields_intervention() {
        let llm = StaticLlm::with_responses(vec![
            r#"{"status": "stuck", "intervention": "Offer a hint."}"#.to_string(),
        ]);
        let monitor = monitor(llm);
        let intervention = monitor
            .analyze(&transcript(6), "Dev", StageType::Technical, "s1")
            .await;
        assert_eq!(intervention.as_deref(), Some("Offer a hint."));
    }

    #[tokio::test]
    async fn test_non_flowing_without_directive_is_ignored() {
        let llm = StaticLlm::with_responses(vec![
            r#"{"status": "stuck", "intervention": null}"#.to_string(),
        ]);
        let monitor = monitor(llm);
        assert!(monitor
            .analyze(&transcript(6), "Dev", StageType::Technical, "s1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_error_yields_none() {
        let llm = StaticLlm::failing("down");
        let monitor = monitor(llm);
        assert!(monitor
            .analyze(&transcript(6), "Dev", StageType::Technical, "s1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_only_recent_turns_in_prompt() {
        let llm = StaticLlm::with_responses(vec![
            r#"{"status": "flowing", "intervention": null}"#.to_string()
        ]);
        let monitor = monitor(llm.clone());
        monitor
            .analyze(&transcript(10), "Dev", StageType::Technical, "s1")
            .await;

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Answer 9"));
        assert!(!prompt.contains("Question 0"));
    }
}
