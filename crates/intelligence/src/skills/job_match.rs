//! Job match evaluator skill
//!
//! Compares resume against job description to pick one targeted comparison
//! angle, selected deterministically from the session ID.

use interview_agent_config::SkillRef;

use crate::hash::stable_index;

use super::{truncate, Skill, SkillContext};

const JD_MIN_CHARS: usize = 20;
const JD_EXCERPT_CHARS: usize = 2_000;

const STRATEGIES: [&str; 4] = [
    r#"STRATEGY: THE GAP HUNTER (Missing Requirements)
- Compare the Job Description (JD) requirements against the Resume.
- Identify 1 critical technical skill from the JD that is MISSING or weak in the Resume.
- Ask: "I see this role requires [Missing Skill], but I don't see much of it in your background. Can you explain your experience with it?""#,
    r#"STRATEGY: THE STRENGTH AMPLIFIER (Core Competencies)
- Identify the STRONGEST match between the Resume and JD.
- Ask a high-level "System Design" or "Best Practice" question related to that shared strength.
- Example: "You have great experience in X (which we need). What is your opinion on the future of X?""#,
    r#"STRATEGY: THE REALIST (Day-to-Day)
- Look at the "Responsibilities" section of the JD.
- Ask: "One of the key responsibilities here is [Responsibility]. Give me an example of a time you handled something similar.""#,
    r#"STRATEGY: THE ADAPTABILITY CHECK
- If the JD mentions a specific industry (e.g., Fintech, Health), check if the candidate has it.
- If they DON'T, ask: "This role is in the [Industry] domain. How would you adapt your skills to this specific field?""#,
];

pub struct JobMatchEvaluator;

impl Skill for JobMatchEvaluator {
    fn id(&self) -> &'static str {
        "job_match"
    }

    fn execute(&self, config: &SkillRef, context: &SkillContext) -> String {
        if context.resume_text.is_empty() || context.job_description.len() < JD_MIN_CHARS {
            return String::new();
        }

        let idx = stable_index(&context.session_id, "job_match", STRATEGIES.len())
            .expect("strategy pool is non-empty");
        let strategy = STRATEGIES[idx];

        let mode = config.mode.as_deref().unwrap_or("balanced").to_uppercase();
        let excerpt = truncate(&context.job_description, JD_EXCERPT_CHARS);

        format!(
            r#"[SKILL: JOB MATCH EVALUATOR ACTIVE]
Mode: {mode}

You have the Job Description (JD).
Your goal is to assess the FIT between the Candidate and the Role.
To keep the assessment dynamic, use this specific comparison strategy:

{strategy}

Context - Job Description:
{excerpt}..."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SkillRef {
        SkillRef {
            id: "job_match".to_string(),
            mode: None,
        }
    }

    #[test]
    fn test_requires_both_documents() {
        let skill = JobMatchEvaluator;

        let mut no_resume = SkillContext::new("s1");
        no_resume.job_description = "A long enough job description".to_string();
        assert!(skill.execute(&config(), &no_resume).is_empty());

        let mut short_jd = SkillContext::new("s1");
        short_jd.resume_text = "Some resume".to_string();
        short_jd.job_description = "too short".to_string();
        assert!(skill.execute(&config(), &short_jd).is_empty());
    }

    #[test]
    fn test_injects_one_strategy() {
        let skill = JobMatchEvaluator;
        let mut ctx = SkillContext::new("s1");
        ctx.resume_text = "Backend engineer resume".to_string();
        ctx.job_description = "We need a backend engineer with Rust experience".to_string();

        let output = skill.execute(&config(), &ctx);
        assert!(output.contains("JOB MATCH EVALUATOR ACTIVE"));
        let strategy_count = ["GAP HUNTER", "STRENGTH AMPLIFIER", "THE REALIST", "ADAPTABILITY CHECK"]
            .iter()
            .filter(|s| output.contains(**s))
            .count();
        assert_eq!(strategy_count, 1);

        // Deterministic per session
        assert_eq!(output, skill.execute(&config(), &ctx));
    }
}
