//! Dynamic question generation
//!
//! Generates contextual questions tailored to the candidate, the stage's
//! competency focus, the current difficulty level, and the topics not yet
//! covered. Failures produce an empty list, never an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use interview_agent_core::StageType;
use interview_agent_llm::LanguageModel;

use crate::difficulty::DifficultyLevel;

/// A generated interview question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub target_competency: String,
    pub difficulty: String,
    /// What from the context inspired this question
    pub context_used: String,
    pub topic: String,
    #[serde(default)]
    pub follow_up_hints: Vec<String>,
}

/// Inputs for question generation
#[derive(Debug, Clone, Default)]
pub struct QuestionContext {
    pub resume_text: String,
    pub job_description: String,
    pub focus_competencies: Vec<String>,
    pub topics_covered: Vec<String>,
    pub identified_gaps: Vec<String>,
    pub performance_summary: String,
}

/// Contextual question generator
pub struct QuestionGenerator {
    llm: Arc<dyn LanguageModel>,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Generate up to `num_questions` prepared questions
    pub async fn generate(
        &self,
        job_role: &str,
        stage_type: StageType,
        difficulty: DifficultyLevel,
        context: &QuestionContext,
        num_questions: usize,
    ) -> Vec<GeneratedQuestion> {
        let resume_excerpt: String = if context.resume_text.is_empty() {
            "Not provided".to_string()
        } else {
            context.resume_text.chars().take(2_000).collect()
        };
        let jd_excerpt: String = if context.job_description.is_empty() {
            "Not provided".to_string()
        } else {
            context.job_description.chars().take(1_500).collect()
        };

        let topics = if context.topics_covered.is_empty() {
            "None yet".to_string()
        } else {
            context.topics_covered.join(", ")
        };
        let gaps = if context.identified_gaps.is_empty() {
            "None identified".to_string()
        } else {
            context.identified_gaps.join(", ")
        };
        let performance = if context.performance_summary.is_empty() {
            "No data yet".to_string()
        } else {
            context.performance_summary.clone()
        };

        let prompt = format!(
            r#"You are an expert interviewer generating highly contextual questions.

**Interview Context:**
- Role: {job_role}
- Stage: {stage_type}
- Current Difficulty: {difficulty}
- Focus Competencies: {}

**Candidate Information:**
{resume_excerpt}

**Job Requirements:**
{jd_excerpt}

**Already Covered Topics (DO NOT REPEAT):**
{topics}

**Identified Gaps to Probe:**
{gaps}

**Recent Performance:**
{performance}

Generate {num_questions} interview questions that:
1. Are SPECIFIC to THIS candidate (reference actual projects/skills from resume if available)
2. Test the focus competencies for this stage
3. Match the {difficulty} difficulty level
4. DO NOT repeat any topics already covered
5. Probe identified gaps if any exist

Return JSON array:
[
  {{
    "question": "The actual question to ask",
    "target_competency": "technical_depth",
    "difficulty": "{difficulty}",
    "context_used": "What from the context inspired this question",
    "topic": "Topic category (e.g., 'system_design', 'leadership')",
    "follow_up_hints": ["Possible follow-up 1", "Possible follow-up 2"]
  }}
]

IMPORTANT: Questions must be specific and actionable, not generic."#,
            context.focus_competencies.join(", "),
        );

        match self.llm.generate_json(&prompt).await {
            Ok(data) => match serde_json::from_value::<Vec<GeneratedQuestion>>(data) {
                Ok(questions) => questions.into_iter().take(num_questions).collect(),
                Err(e) => {
                    tracing::error!(error = %e, "Question generation returned unexpected shape");
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Question generation failed");
                Vec::new()
            }
        }
    }

    /// Render generated questions as a prompt block
    pub fn to_prompt_block(questions: &[GeneratedQuestion]) -> String {
        if questions.is_empty() {
            return String::new();
        }

        questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. [{}] {}", i + 1, q.topic, q.question))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_llm::StaticLlm;

    #[tokio::test]
    async fn test_generation_parses_questions() {
        let llm = StaticLlm::with_responses(vec![r#"[
            {
                "question": "You mentioned scaling the billing service. What broke first under load?",
                "target_competency": "technical_depth",
                "difficulty": "advanced",
                "context_used": "resume billing project",
                "topic": "scalability",
                "follow_up_hints": ["Ask about the fix"]
            }
        ]"#
        .to_string()]);
        let generator = QuestionGenerator::new(Arc::new(llm));

        let questions = generator
            .generate(
                "Backend Developer",
                StageType::Technical,
                DifficultyLevel::Advanced,
                &QuestionContext::default(),
                3,
            )
            .await;

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].topic, "scalability");

        let block = QuestionGenerator::to_prompt_block(&questions);
        assert!(block.contains("1. [scalability]"));
    }

    #[tokio::test]
    async fn test_caps_at_requested_count() {
        let item = r#"{"question": "Q", "target_competency": "c", "difficulty": "intermediate",
                       "context_used": "", "topic": "t", "follow_up_hints": []}"#;
        let llm = StaticLlm::with_responses(vec![format!("[{item},{item},{item},{item}]")]);
        let generator = QuestionGenerator::new(Arc::new(llm));

        let questions = generator
            .generate(
                "Dev",
                StageType::Hr,
                DifficultyLevel::Intermediate,
                &QuestionContext::default(),
                2,
            )
            .await;
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_yields_empty() {
        let generator = QuestionGenerator::new(Arc::new(StaticLlm::failing("down")));
        let questions = generator
            .generate(
                "Dev",
                StageType::Hr,
                DifficultyLevel::Intermediate,
                &QuestionContext::default(),
                3,
            )
            .await;
        assert!(questions.is_empty());
        assert_eq!(QuestionGenerator::to_prompt_block(&questions), "");
    }

    #[tokio::test]
    async fn test_topics_flow_into_prompt() {
        let llm = StaticLlm::with_responses(vec!["[]".to_string()]);
        let generator = QuestionGenerator::new(Arc::new(llm.clone()));

        let context = QuestionContext {
            topics_covered: vec!["career_history".to_string()],
            identified_gaps: vec!["Kubernetes".to_string()],
            ..Default::default()
        };
        generator
            .generate("Dev", StageType::Technical, DifficultyLevel::Expert, &context, 3)
            .await;

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("career_history"));
        assert!(prompt.contains("Kubernetes"));
        assert!(prompt.contains("expert"));
    }
}
