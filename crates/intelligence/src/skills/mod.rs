//! Prompt-fragment skills
//!
//! A skill is a pure function from context to a prompt fragment. Skills
//! perform no I/O; an empty fragment means the skill has nothing to
//! contribute. Two global guardrail skills run on every prompt build before
//! any persona-declared skills.

pub mod bias_filter;
pub mod job_match;
pub mod registry;
pub mod resume_probe;
pub mod sales_objection;
pub mod star_watchdog;
pub mod topic_blocker;

pub use registry::SkillRegistry;

use interview_agent_config::SkillRef;
use interview_agent_core::{Language, StageType};

/// Context available to skills at prompt-composition time
#[derive(Debug, Clone)]
pub struct SkillContext {
    pub job_role: String,
    pub resume_text: String,
    pub job_description: String,
    pub language: Language,
    pub stage_type: StageType,
    /// Stable key for deterministic variant selection
    pub session_id: String,
}

impl SkillContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            job_role: String::new(),
            resume_text: String::new(),
            job_description: String::new(),
            language: Language::En,
            stage_type: StageType::Hr,
            session_id: session_id.into(),
        }
    }
}

/// A prompt-fragment generator
pub trait Skill: Send + Sync {
    /// Registry ID
    fn id(&self) -> &'static str;

    /// Produce the prompt fragment; empty means nothing to inject
    fn execute(&self, config: &SkillRef, context: &SkillContext) -> String;
}

/// Truncate text to `max` characters on a char boundary
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
