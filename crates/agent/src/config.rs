//! Orchestrator configuration

use std::time::Duration;

/// Tunables for one session orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval between periodic transcript saves
    pub save_interval: Duration,
    /// Budget per shutdown step; a step over budget is skipped
    pub shutdown_step_budget: Duration,
    /// Deadline for LLM-backed boot work (cold starts included)
    pub prewarm_deadline: Duration,
    /// Minimum user answer length (chars) to schedule scoring
    pub scoring_min_answer_chars: usize,
    /// Upper bound on the live instruction after runtime updates
    pub max_instruction_chars: usize,
    /// Prepared questions generated at boot
    pub prepared_question_count: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            save_interval: Duration::from_secs(30),
            shutdown_step_budget: Duration::from_secs(30),
            prewarm_deadline: Duration::from_secs(180),
            scoring_min_answer_chars: 20,
            max_instruction_chars: 48_000,
            prepared_question_count: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.save_interval, Duration::from_secs(30));
        assert_eq!(config.shutdown_step_budget, Duration::from_secs(30));
        assert_eq!(config.prewarm_deadline, Duration::from_secs(180));
        assert_eq!(config.scoring_min_answer_chars, 20);
    }
}
