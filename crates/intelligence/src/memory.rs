//! Cross-stage memory
//!
//! At session end, extracts durable insights from the stage and persists
//! them on the parent application. Subsequent stages read the insights of
//! earlier stages only and render them as a do-not-repeat context block.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use interview_agent_core::{StageType, Transcript};
use interview_agent_llm::LanguageModel;
use interview_agent_persistence::ApplicationStore;

use crate::competency::TurnScoreRecord;
use crate::profile::CandidateProfile;

const TRANSCRIPT_TAIL_TURNS: usize = 20;

/// Insights extracted from one completed interview stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageInsights {
    pub stage_type: String,
    pub summary: String,
    pub communication_style: String,
    pub verified_skills: Vec<String>,
    pub red_flags: Vec<String>,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub key_topics_covered: Vec<String>,
    pub overall_score: f64,
    pub confidence: f64,
    pub notes: String,
}

impl StageInsights {
    fn minimal(stage_type: StageType, profile: &CandidateProfile) -> Self {
        let overall_score = trajectory_mean(profile).unwrap_or(50.0);
        Self {
            stage_type: stage_type.as_str().to_string(),
            summary: "Stage completed (insights extraction failed)".to_string(),
            communication_style: "unknown".to_string(),
            verified_skills: Vec::new(),
            red_flags: Vec::new(),
            strengths: Vec::new(),
            concerns: Vec::new(),
            key_topics_covered: Vec::new(),
            overall_score,
            confidence: 0.0,
            notes: String::new(),
        }
    }
}

fn trajectory_mean(profile: &CandidateProfile) -> Option<f64> {
    if profile.performance_trajectory.is_empty() {
        return None;
    }
    Some(
        profile.performance_trajectory.iter().sum::<f64>()
            / profile.performance_trajectory.len() as f64,
    )
}

/// Manages cross-stage interview memory
pub struct CrossStageMemory {
    llm: Arc<dyn LanguageModel>,
    applications: Arc<dyn ApplicationStore>,
}

impl CrossStageMemory {
    pub fn new(llm: Arc<dyn LanguageModel>, applications: Arc<dyn ApplicationStore>) -> Self {
        Self { llm, applications }
    }

    /// Extract and persist insights at the end of a stage
    ///
    /// Extraction failures degrade to minimal insights; persistence
    /// failures are logged and the extracted insights still returned.
    pub async fn save_stage_insights(
        &self,
        application_id: &str,
        stage_type: StageType,
        profile: &CandidateProfile,
        transcript: &Transcript,
        scores: &[TurnScoreRecord],
        job_role: &str,
    ) -> StageInsights {
        let insights = match self
            .extract_insights(stage_type, profile, transcript, scores, job_role)
            .await
        {
            Ok(insights) => insights,
            Err(e) => {
                tracing::error!(error = %e, "Insight extraction failed");
                StageInsights::minimal(stage_type, profile)
            }
        };

        match serde_json::to_value(&insights) {
            Ok(value) => {
                if let Err(e) = self
                    .applications
                    .merge_stage_insights(application_id, stage_type.as_str(), value)
                    .await
                {
                    tracing::error!(error = %e, application_id, "Failed to persist stage insights");
                } else {
                    tracing::info!(application_id, stage = %stage_type, "Saved stage insights");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize stage insights"),
        }

        insights
    }

    async fn extract_insights(
        &self,
        stage_type: StageType,
        profile: &CandidateProfile,
        transcript: &Transcript,
        scores: &[TurnScoreRecord],
        job_role: &str,
    ) -> Result<StageInsights, interview_agent_llm::LlmError> {
        let transcript_summary: String = transcript
            .recent(TRANSCRIPT_TAIL_TURNS)
            .iter()
            .map(|turn| {
                let excerpt: String = turn.content.chars().take(200).collect();
                format!("{}: {excerpt}...", turn.role)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let transcript_summary: String = transcript_summary.chars().take(2_000).collect();

        let scores_summary = if scores.is_empty() {
            "No detailed scores available".to_string()
        } else {
            let avg: f64 = scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64;
            format!("Average: {avg:.1}/100 across {} questions", scores.len())
        };

        let profile_json: String = serde_json::to_string(profile)
            .unwrap_or_default()
            .chars()
            .take(1_500)
            .collect();

        let prompt = format!(
            r#"Analyze this interview stage and extract key insights for the next interviewer.

STAGE: {stage_type}
JOB ROLE: {job_role}

CANDIDATE PROFILE:
{profile_json}

TRANSCRIPT SUMMARY (last messages):
{transcript_summary}

SCORES:
{scores_summary}

Extract insights that would be valuable for the NEXT interviewer to know:
1. What was verified about the candidate?
2. What concerns were raised?
3. What topics were already covered (don't repeat)?
4. What communication style did the candidate exhibit?
5. What should the next stage focus on?

Return JSON:
{{
    "summary": "Brief 2-3 sentence summary of the stage outcome",
    "communication_style": "e.g., 'concise and technical' or 'verbose but thoughtful'",
    "verified_skills": ["skill1", "skill2"],
    "red_flags": ["concern1"],
    "strengths": ["strength1"],
    "concerns": ["areas needing further exploration"],
    "key_topics_covered": ["topic1", "topic2"],
    "notes": "Any other important observations"
}}"#
        );

        let data = self.llm.generate_json(&prompt).await?;

        let string_list = |field: &str| -> Vec<String> {
            data.get(field)
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| s.to_string())
                        .collect()
                })
                .unwrap_or_default()
        };
        let string_field = |field: &str| -> String {
            data.get(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(StageInsights {
            stage_type: stage_type.as_str().to_string(),
            summary: string_field("summary"),
            communication_style: string_field("communication_style"),
            verified_skills: string_list("verified_skills"),
            red_flags: string_list("red_flags"),
            strengths: string_list("strengths"),
            concerns: string_list("concerns"),
            key_topics_covered: string_list("key_topics_covered"),
            overall_score: trajectory_mean(profile).unwrap_or(50.0),
            confidence: 0.8,
            notes: string_field("notes"),
        })
    }

    /// Insights from stages preceding `current_stage`, in stage order
    pub async fn get_previous_insights(
        &self,
        application_id: &str,
        current_stage: StageType,
    ) -> Vec<StageInsights> {
        let all = match self.applications.get_cross_stage_insights(application_id).await {
            Ok(all) => all,
            Err(e) => {
                tracing::error!(error = %e, application_id, "Failed to retrieve insights");
                return Vec::new();
            }
        };

        current_stage
            .preceding_stages()
            .into_iter()
            .filter_map(|stage| {
                all.get(stage.as_str())
                    .and_then(|value| serde_json::from_value(value.clone()).ok())
            })
            .collect()
    }

    /// Render a do-not-repeat context block from previous-stage insights
    pub fn build_context_prompt(&self, insights: &[StageInsights]) -> String {
        if insights.is_empty() {
            return String::new();
        }

        let mut sections = vec![
            "PREVIOUS STAGE INSIGHTS:".to_string(),
            "DO NOT repeat topics already covered. Build on these findings.\n".to_string(),
        ];

        for stage in insights {
            let mut block = format!(
                "[{} STAGE - Score: {:.0}/100]\nSummary: {}\nCommunication Style: {}\nVerified Skills: {}\nConcerns to Follow Up: {}\nTOPICS ALREADY COVERED (DO NOT REPEAT): {}",
                stage.stage_type.to_uppercase(),
                stage.overall_score,
                stage.summary,
                stage.communication_style,
                join_or(&stage.verified_skills, 5, "None verified"),
                join_or(&stage.concerns, 3, "None"),
                join_or(&stage.key_topics_covered, 8, "None"),
            );
            if !stage.red_flags.is_empty() {
                block.push_str(&format!("\nRED FLAGS: {}", join_or(&stage.red_flags, 3, "")));
            }
            sections.push(block);
        }

        sections.join("\n")
    }

    /// Brief PASSED/CONCERNS hand-off line per prior stage
    pub fn handoff_summary(&self, insights: &[StageInsights]) -> String {
        if insights.is_empty() {
            return "No previous stage data available.".to_string();
        }

        insights
            .iter()
            .map(|stage| {
                let status = if stage.overall_score >= 60.0 {
                    "PASSED"
                } else {
                    "CONCERNS"
                };
                format!(
                    "{}: {status} ({:.0}%)",
                    stage.stage_type.to_uppercase(),
                    stage.overall_score
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn join_or(items: &[String], cap: usize, fallback: &str) -> String {
    if items.is_empty() {
        return fallback.to_string();
    }
    items
        .iter()
        .take(cap)
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_core::Turn;
    use interview_agent_llm::StaticLlm;
    use interview_agent_persistence::{ApplicationRecord, MemoryApplicationStore};

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.push(Turn::assistant("Walk me through your career so far."));
        t.push(Turn::user("I started as a junior developer and moved into platform work."));
        t
    }

    fn store_with_app() -> Arc<MemoryApplicationStore> {
        let store = Arc::new(MemoryApplicationStore::new());
        store.insert(ApplicationRecord::new("app-1", "Backend Developer"));
        store
    }

    fn extraction_response() -> String {
        r#"{
            "summary": "Candidate has a steady growth arc.",
            "communication_style": "concise and structured",
            "verified_skills": ["Rust"],
            "red_flags": [],
            "strengths": ["ownership"],
            "concerns": ["limited cloud exposure"],
            "key_topics_covered": ["career_history"],
            "notes": "Strong platform background"
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let store = store_with_app();
        let llm = StaticLlm::with_responses(vec![extraction_response()]);
        let memory = CrossStageMemory::new(Arc::new(llm), store.clone());

        let profile = CandidateProfile {
            performance_trajectory: vec![70.0, 80.0],
            ..Default::default()
        };

        let insights = memory
            .save_stage_insights("app-1", StageType::Hr, &profile, &transcript(), &[], "Backend Developer")
            .await;
        assert_eq!(insights.overall_score, 75.0);
        assert_eq!(insights.key_topics_covered, vec!["career_history"]);

        let previous = memory.get_previous_insights("app-1", StageType::Technical).await;
        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].stage_type, "hr");
        assert_eq!(previous[0], insights);
    }

    #[tokio::test]
    async fn test_only_preceding_stages_returned() {
        let store = store_with_app();
        let llm = StaticLlm::with_responses(vec![extraction_response(), extraction_response()]);
        let memory = CrossStageMemory::new(Arc::new(llm), store.clone());
        let profile = CandidateProfile::default();

        memory
            .save_stage_insights("app-1", StageType::Hr, &profile, &transcript(), &[], "Dev")
            .await;
        memory
            .save_stage_insights("app-1", StageType::Technical, &profile, &transcript(), &[], "Dev")
            .await;

        // Technical sees only HR
        let for_technical = memory.get_previous_insights("app-1", StageType::Technical).await;
        assert_eq!(for_technical.len(), 1);
        assert_eq!(for_technical[0].stage_type, "hr");

        // Behavioral sees both, in stage order
        let for_behavioral = memory.get_previous_insights("app-1", StageType::Behavioral).await;
        assert_eq!(for_behavioral.len(), 2);
        assert_eq!(for_behavioral[0].stage_type, "hr");
        assert_eq!(for_behavioral[1].stage_type, "technical");

        // HR and practice see nothing
        assert!(memory.get_previous_insights("app-1", StageType::Hr).await.is_empty());
        assert!(memory.get_previous_insights("app-1", StageType::Practice).await.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_writes_minimal_insights() {
        let store = store_with_app();
        let llm = StaticLlm::failing("model down");
        let memory = CrossStageMemory::new(Arc::new(llm), store.clone());

        let profile = CandidateProfile {
            performance_trajectory: vec![60.0],
            ..Default::default()
        };
        let insights = memory
            .save_stage_insights("app-1", StageType::Hr, &profile, &transcript(), &[], "Dev")
            .await;

        assert_eq!(insights.summary, "Stage completed (insights extraction failed)");
        assert_eq!(insights.overall_score, 60.0);
        assert_eq!(insights.confidence, 0.0);

        // Minimal insights are still persisted
        let previous = memory.get_previous_insights("app-1", StageType::Technical).await;
        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_empty_trajectory_defaults_to_fifty() {
        let store = store_with_app();
        let llm = StaticLlm::failing("down");
        let memory = CrossStageMemory::new(Arc::new(llm), store);

        let insights = memory
            .save_stage_insights(
                "app-1",
                StageType::Hr,
                &CandidateProfile::default(),
                &transcript(),
                &[],
                "Dev",
            )
            .await;
        assert_eq!(insights.overall_score, 50.0);
    }

    #[test]
    fn test_context_prompt_rendering() {
        let store = Arc::new(MemoryApplicationStore::new());
        let memory = CrossStageMemory::new(Arc::new(StaticLlm::new()), store);

        let insights = vec![StageInsights {
            stage_type: "hr".to_string(),
            summary: "Good cultural fit.".to_string(),
            communication_style: "warm".to_string(),
            verified_skills: vec!["communication".to_string()],
            red_flags: vec!["gap in 2021".to_string()],
            strengths: vec![],
            concerns: vec!["depth unclear".to_string()],
            key_topics_covered: vec!["career_history".to_string()],
            overall_score: 72.0,
            confidence: 0.8,
            notes: String::new(),
        }];

        let block = memory.build_context_prompt(&insights);
        assert!(block.contains("PREVIOUS STAGE INSIGHTS:"));
        assert!(block.contains("[HR STAGE - Score: 72/100]"));
        assert!(block.contains("TOPICS ALREADY COVERED (DO NOT REPEAT): career_history"));
        assert!(block.contains("RED FLAGS: gap in 2021"));

        assert_eq!(memory.build_context_prompt(&[]), "");
    }

    #[test]
    fn test_handoff_summary() {
        let store = Arc::new(MemoryApplicationStore::new());
        let memory = CrossStageMemory::new(Arc::new(StaticLlm::new()), store);

        let mut stage = StageInsights {
            stage_type: "hr".to_string(),
            summary: String::new(),
            communication_style: String::new(),
            verified_skills: vec![],
            red_flags: vec![],
            strengths: vec![],
            concerns: vec![],
            key_topics_covered: vec![],
            overall_score: 72.0,
            confidence: 0.8,
            notes: String::new(),
        };
        let passed = memory.handoff_summary(std::slice::from_ref(&stage));
        assert_eq!(passed, "HR: PASSED (72%)");

        stage.overall_score = 40.0;
        let concerns = memory.handoff_summary(std::slice::from_ref(&stage));
        assert_eq!(concerns, "HR: CONCERNS (40%)");

        assert_eq!(memory.handoff_summary(&[]), "No previous stage data available.");
    }
}
