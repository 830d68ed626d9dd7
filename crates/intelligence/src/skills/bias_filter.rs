//! Bias filter guardrail
//!
//! Injects a high-priority negative constraint forbidding illegal or
//! discriminatory interview questions.

use interview_agent_config::SkillRef;

use super::{Skill, SkillContext};

pub struct BiasFilter;

impl Skill for BiasFilter {
    fn id(&self) -> &'static str {
        "bias_filter"
    }

    fn execute(&self, _config: &SkillRef, _context: &SkillContext) -> String {
        r#"[SKILL: BIAS FILTER ACTIVE]
CRITICAL LEGAL COMPLIANCE RULES:
You are strictly FORBIDDEN from asking about:
- Age, Date of Birth, or Graduation Years (unless present to verify timeline).
- Marital Status, Children, or Pregnancy.
- Religion, Politics, or Ethnicity.
- Disabilities or Health Conditions.

Focus ONLY on professional competency and diverse work experiences.
If the candidate volunteers this info, acknowledge politely and pivot back to work."#
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_injects() {
        let skill = BiasFilter;
        let output = skill.execute(
            &SkillRef {
                id: "bias_filter".to_string(),
                mode: None,
            },
            &SkillContext::new("s1"),
        );
        assert!(output.contains("FORBIDDEN"));
        assert!(output.contains("Marital Status"));
    }
}
