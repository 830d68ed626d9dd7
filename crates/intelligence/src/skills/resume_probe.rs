//! Resume probe skill
//!
//! Picks one stage-bucketed line of inquiry against the candidate's resume.
//! The strategy is selected deterministically from the session ID so the
//! interviewer keeps a single angle across prompt rebuilds, and never
//! crosses into another stage's territory.

use interview_agent_config::SkillRef;
use interview_agent_core::StageType;

use crate::hash::stable_index;

use super::{truncate, Skill, SkillContext};

const RESUME_MIN_CHARS: usize = 50;
const RESUME_EXCERPT_CHARS: usize = 2_500;

// HR: career trajectory, culture fit, soft skills
const HR_STRATEGIES: [&str; 3] = [
    r#"STRATEGY: THE CHRONOLOGIST
- Focus on their career trajectory. Ask why they moved from one role to another.
- Ask how their responsibilities changed over time.
- If you see a gap > 6 months, ask about it gently.
- DO NOT ask technical implementation questions."#,
    r#"STRATEGY: THE CULTURE FIT
- Look at their volunteer work or "Interests" section if it exists.
- Ask how they handle team conflicts based on their past roles.
- Ask what they learned from their longest-held position.
- Focus on communication style and team dynamics."#,
    r#"STRATEGY: THE RED FLAG HUNTER
- Look for job hopping patterns (multiple jobs < 1 year).
- Ask about unexplained gaps in employment.
- Probe reasons for leaving previous positions.
- Assess commitment and stability."#,
];

// Technical: depth, implementation detail, trade-offs
const TECHNICAL_STRATEGIES: [&str; 4] = [
    r#"STRATEGY: THE SKEPTIC
- Pick 2 specific technical claims and ask: "How exactly did you implement that?"
- Verify the depth of their most listed technical skill with edge-case questions.
- Ask about internal workings, not just usage (e.g., "How does X handle memory?").
- DO NOT ask about career journey or culture fit."#,
    r#"STRATEGY: THE PROJECT DIVER
- Focus deeply on their MOST RECENT technical project.
- Ask: "What was your specific technical contribution vs the team's?"
- Ask them to explain a technical trade-off they made and WHY.
- Probe for real experience vs tutorial knowledge."#,
    r#"STRATEGY: THE ARCHITECTURE ANALYST
- Look for system design or architecture experience in their resume.
- Ask how they would scale a system they mentioned.
- Probe database choices, caching strategies, or API design decisions.
- Focus on technical decision-making rationale."#,
    r#"STRATEGY: THE DEBUGGER
- Ask about the most difficult bug they've solved.
- Probe their debugging methodology and tools.
- Ask about production incidents and how they handled them.
- Focus on problem-solving approach under pressure."#,
];

// Behavioral: leadership, conflict resolution, growth
const BEHAVIORAL_STRATEGIES: [&str; 3] = [
    r#"STRATEGY: THE FAILURE ANALYST
- Look for leadership or team-lead roles in their history.
- Ask about a project that did NOT go well and what they learned.
- Probe for self-awareness and growth from mistakes.
- DO NOT ask technical implementation details."#,
    r#"STRATEGY: THE INFLUENCE MAPPER
- Focus on roles where they worked cross-functionally.
- Ask how they influenced decisions without formal authority.
- Explore conflict resolution patterns in their past roles.
- Assess leadership potential and collaboration skills."#,
    r#"STRATEGY: THE GROWTH TRACKER
- Compare their early career roles to recent ones.
- Ask what skills they developed over time.
- Probe for self-improvement initiatives and learning mindset.
- Focus on career growth and ambition."#,
];

const PRACTICE_STRATEGIES: [&str; 1] = [r#"STRATEGY: THE WELL-ROUNDED PROBE
- Ask about their strongest technical skill and verify depth.
- Ask about a challenging team situation they navigated.
- Cover both technical competence and soft skills.
- Keep energy high and provide constructive feedback."#];

pub struct ResumeProbe;

impl Skill for ResumeProbe {
    fn id(&self) -> &'static str {
        "resume_probe"
    }

    fn execute(&self, config: &SkillRef, context: &SkillContext) -> String {
        if context.resume_text.len() < RESUME_MIN_CHARS {
            return String::new();
        }

        let strategies: &[&str] = match context.stage_type {
            StageType::Hr => &HR_STRATEGIES,
            StageType::Technical => &TECHNICAL_STRATEGIES,
            StageType::Behavioral => &BEHAVIORAL_STRATEGIES,
            StageType::Practice => &PRACTICE_STRATEGIES,
        };

        let idx = stable_index(&context.session_id, "resume_probe", strategies.len())
            .expect("strategy pools are non-empty");
        let strategy = strategies[idx];

        let mode = config.mode.as_deref().unwrap_or("analysis").to_uppercase();
        let stage = context.stage_type.as_str().to_uppercase();
        let excerpt = truncate(&context.resume_text, RESUME_EXCERPT_CHARS);

        format!(
            r#"[SKILL: RESUME DEEP DIVE ACTIVE]
Mode: {mode}
Stage: {stage}

You have reviewed the candidate's resume.
To make the interview feel natural and unique, follow this specific line of inquiry:

{strategy}

IMPORTANT: Stay within your stage's focus area. Do not cross into other stages' territory.

Context from Resume:
{excerpt}..."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(stage: StageType, resume: &str) -> SkillContext {
        let mut ctx = SkillContext::new("session-1");
        ctx.stage_type = stage;
        ctx.resume_text = resume.to_string();
        ctx
    }

    fn long_resume() -> String {
        "Senior backend engineer with eight years of experience building distributed systems."
            .to_string()
    }

    #[test]
    fn test_short_resume_yields_nothing() {
        let skill = ResumeProbe;
        let config = SkillRef {
            id: "resume_probe".to_string(),
            mode: None,
        };
        let output = skill.execute(&config, &context(StageType::Technical, "too short"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_stage_bucketed_strategies() {
        let skill = ResumeProbe;
        let config = SkillRef {
            id: "resume_probe".to_string(),
            mode: None,
        };
        let resume = long_resume();

        let hr = skill.execute(&config, &context(StageType::Hr, &resume));
        assert!(hr.contains("Stage: HR"));
        assert!(
            hr.contains("CHRONOLOGIST") || hr.contains("CULTURE FIT") || hr.contains("RED FLAG")
        );
        // HR strategies never contain the technical pool
        assert!(!hr.contains("THE SKEPTIC"));

        let technical = skill.execute(&config, &context(StageType::Technical, &resume));
        assert!(technical.contains("Stage: TECHNICAL"));
        assert!(!technical.contains("CHRONOLOGIST"));
    }

    #[test]
    fn test_deterministic_per_session() {
        let skill = ResumeProbe;
        let config = SkillRef {
            id: "resume_probe".to_string(),
            mode: Some("analysis".to_string()),
        };
        let resume = long_resume();

        let first = skill.execute(&config, &context(StageType::Technical, &resume));
        let second = skill.execute(&config, &context(StageType::Technical, &resume));
        assert_eq!(first, second);
    }

    #[test]
    fn test_resume_excerpt_is_truncated() {
        let skill = ResumeProbe;
        let config = SkillRef {
            id: "resume_probe".to_string(),
            mode: None,
        };
        let huge = "x".repeat(10_000);
        let output = skill.execute(&config, &context(StageType::Hr, &huge));
        // Excerpt capped plus surrounding template text
        assert!(output.len() < RESUME_EXCERPT_CHARS + 1_500);
    }
}
