//! Skill registry
//!
//! Maps skill IDs to implementations and runs them in order: the global
//! guardrail prefix first, then persona-declared skills. Duplicate IDs
//! execute once; empty fragments are dropped.

use std::collections::{HashMap, HashSet};

use interview_agent_config::SkillRef;

use super::bias_filter::BiasFilter;
use super::job_match::JobMatchEvaluator;
use super::resume_probe::ResumeProbe;
use super::sales_objection::SalesObjectionSimulator;
use super::star_watchdog::StarWatchdog;
use super::topic_blocker::TopicBlocker;
use super::{Skill, SkillContext};

/// Skills applied to every prompt build, before persona skills
const GLOBAL_SKILLS: [&str; 2] = ["bias_filter", "topic_blocker"];

/// Central skill catalog
pub struct SkillRegistry {
    skills: HashMap<&'static str, Box<dyn Skill>>,
}

impl SkillRegistry {
    /// Registry with all built-in skills
    pub fn with_builtin_skills() -> Self {
        let mut registry = Self {
            skills: HashMap::new(),
        };
        registry.register(Box::new(BiasFilter));
        registry.register(Box::new(TopicBlocker));
        registry.register(Box::new(ResumeProbe));
        registry.register(Box::new(JobMatchEvaluator));
        registry.register(Box::new(StarWatchdog));
        registry.register(Box::new(SalesObjectionSimulator));
        registry
    }

    pub fn register(&mut self, skill: Box<dyn Skill>) {
        self.skills.insert(skill.id(), skill);
    }

    pub fn get(&self, skill_id: &str) -> Option<&dyn Skill> {
        self.skills.get(skill_id).map(|s| s.as_ref())
    }

    /// Execute global skills followed by persona skills, deduplicated by ID
    pub fn execute_all(&self, persona_skills: &[SkillRef], context: &SkillContext) -> String {
        let global: Vec<SkillRef> = GLOBAL_SKILLS
            .iter()
            .map(|id| SkillRef {
                id: id.to_string(),
                mode: None,
            })
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut fragments = Vec::new();

        for skill_ref in global.iter().chain(persona_skills.iter()) {
            if skill_ref.id.is_empty() || !seen.insert(skill_ref.id.as_str()) {
                continue;
            }

            match self.get(&skill_ref.id) {
                Some(skill) => {
                    let fragment = skill.execute(skill_ref, context);
                    if !fragment.trim().is_empty() {
                        fragments.push(fragment.trim().to_string());
                    }
                }
                None => {
                    tracing::warn!(skill_id = %skill_ref.id, "Skill not found in registry");
                }
            }
        }

        fragments.join("\n\n")
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::with_builtin_skills()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_core::StageType;

    fn skill_ref(id: &str) -> SkillRef {
        SkillRef {
            id: id.to_string(),
            mode: None,
        }
    }

    #[test]
    fn test_global_skills_always_run_first() {
        let registry = SkillRegistry::with_builtin_skills();
        let context = SkillContext::new("s1");

        let output = registry.execute_all(&[], &context);
        let bias_pos = output.find("BIAS FILTER").unwrap();
        let blocker_pos = output.find("TOPIC BLOCKER").unwrap();
        assert!(bias_pos < blocker_pos);
    }

    #[test]
    fn test_duplicates_execute_once() {
        let registry = SkillRegistry::with_builtin_skills();
        let context = SkillContext::new("s1");

        let output = registry.execute_all(&[skill_ref("bias_filter"), skill_ref("bias_filter")], &context);
        assert_eq!(output.matches("BIAS FILTER").count(), 1);
    }

    #[test]
    fn test_empty_fragments_are_dropped() {
        let registry = SkillRegistry::with_builtin_skills();
        // No resume: resume_probe contributes nothing
        let mut context = SkillContext::new("s1");
        context.stage_type = StageType::Technical;

        let output = registry.execute_all(&[skill_ref("resume_probe")], &context);
        assert!(!output.contains("RESUME DEEP DIVE"));
    }

    #[test]
    fn test_unknown_skill_is_skipped() {
        let registry = SkillRegistry::with_builtin_skills();
        let context = SkillContext::new("s1");
        let output = registry.execute_all(&[skill_ref("does_not_exist")], &context);
        // Guardrails still present, unknown skill ignored
        assert!(output.contains("BIAS FILTER"));
    }

    #[test]
    fn test_persona_skill_runs_after_globals() {
        let registry = SkillRegistry::with_builtin_skills();
        let context = SkillContext::new("s1");
        let output = registry.execute_all(&[skill_ref("star_watchdog")], &context);

        let blocker_pos = output.find("TOPIC BLOCKER").unwrap();
        let star_pos = output.find("STAR METHOD WATCHDOG").unwrap();
        assert!(blocker_pos < star_pos);
    }
}
