//! Sales objection simulator
//!
//! Roleplay skill for sales-oriented sessions: the interviewer becomes a
//! skeptical prospect with one randomly chosen objection scenario.

use interview_agent_config::SkillRef;
use rand::seq::SliceRandom;

use super::{Skill, SkillContext};

const SCENARIOS: [&str; 4] = [
    "OBJECTION: PRICE - Say: 'I like the product, but it's 20% more expensive than the competitor. Why should I pay more?'",
    "OBJECTION: AUTHORITY - Say: 'I'm not the decision maker, and my boss hates changing vendors. Give me something to convince him.'",
    "OBJECTION: TIMING - Say: 'We are freezing budget until Q4. Why should we buy now?'",
    "OBJECTION: TRUST - Say: 'I've heard your support is terrible. Convince me otherwise.'",
];

pub struct SalesObjectionSimulator;

impl Skill for SalesObjectionSimulator {
    fn id(&self) -> &'static str {
        "sales_objection"
    }

    fn execute(&self, _config: &SkillRef, _context: &SkillContext) -> String {
        let scenario = SCENARIOS
            .choose(&mut rand::thread_rng())
            .expect("scenario pool is non-empty");

        format!(
            r#"[SKILL: SALES SIMULATION ACTIVE]
Mode: ROLEPLAY_OBJECTION

You are NO LONGER just an interviewer. You are a SKEPTICAL PROSPECT.
Do not accept their first answer easily. Push back once.

Your current Objection Scenario:
{scenario}

Evaluate how they handle the pressure. Do they listen? Do they empathize? Or do they argue?"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_one_scenario() {
        let skill = SalesObjectionSimulator;
        let output = skill.execute(
            &SkillRef {
                id: "sales_objection".to_string(),
                mode: None,
            },
            &SkillContext::new("s1"),
        );
        assert!(output.contains("ROLEPLAY_OBJECTION"));
        let count = SCENARIOS.iter().filter(|s| output.contains(**s)).count();
        assert_eq!(count, 1);
    }
}
