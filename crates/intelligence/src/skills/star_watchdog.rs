//! STAR method watchdog
//!
//! Injects a listening-mode directive: when the candidate tells a story with
//! plural pronouns or without an outcome, the interviewer asks for the
//! missing Action or Result.

use interview_agent_config::SkillRef;

use super::{Skill, SkillContext};

pub struct StarWatchdog;

impl Skill for StarWatchdog {
    fn id(&self) -> &'static str {
        "star_watchdog"
    }

    fn execute(&self, _config: &SkillRef, _context: &SkillContext) -> String {
        r#"[SKILL: STAR METHOD WATCHDOG ACTIVE]
Mode: LISTENING_FOR_STRUCTURE

As the candidate tells their story, check for the STAR components:
1. Situation/Task (The Context)
2. Action (What THEY specifically did)
3. Result (The Outcome/Metrics)

IF they finish their story and missed 'Action' (used "we" too much) -> Ask: "What was YOUR specific role in that?"
IF they finish their story and missed 'Result' -> Ask: "What was the final outcome or impact of that?""#
            .to_string()
    }
}
