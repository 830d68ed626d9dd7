//! Adaptive difficulty
//!
//! Adjusts question difficulty over a sliding window of recent scores.
//! Hysteresis: a level must host at least `min_turns_at_level` scored turns
//! before a change is considered, and moves are single steps on the ladder.

use serde::{Deserialize, Serialize};

/// Interview difficulty ladder, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Foundational,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

const LADDER: [DifficultyLevel; 4] = [
    DifficultyLevel::Foundational,
    DifficultyLevel::Intermediate,
    DifficultyLevel::Advanced,
    DifficultyLevel::Expert,
];

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundational => "foundational",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "foundational" => Self::Foundational,
            "advanced" => Self::Advanced,
            "expert" => Self::Expert,
            _ => Self::Intermediate,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Foundational => "Basic concepts and fundamentals",
            Self::Intermediate => "Applied knowledge and common scenarios",
            Self::Advanced => "Complex scenarios and edge cases",
            Self::Expert => "Industry-leading, architectural decisions",
        }
    }

    pub fn question_guidance(&self) -> &'static str {
        match self {
            Self::Foundational => {
                "Ask about basic concepts, definitions, and simple use cases. Single-step problems."
            }
            Self::Intermediate => {
                "Ask about common patterns, standard implementations, and typical scenarios. Multi-step problems."
            }
            Self::Advanced => {
                "Ask about edge cases, optimization, trade-offs, and complex integrations. Requires analysis."
            }
            Self::Expert => {
                "Ask about architectural decisions, innovation, and strategic thinking. Open-ended design problems."
            }
        }
    }

    fn next_up(&self) -> DifficultyLevel {
        let idx = LADDER.iter().position(|l| l == self).unwrap_or(1);
        LADDER[(idx + 1).min(LADDER.len() - 1)]
    }

    fn next_down(&self) -> DifficultyLevel {
        let idx = LADDER.iter().position(|l| l == self).unwrap_or(1);
        LADDER[idx.saturating_sub(1)]
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current difficulty state with decision metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifficultyState {
    pub level: DifficultyLevel,
    pub turns_at_level: u32,
    pub last_change_turn: u32,
    pub change_reason: Option<String>,
    /// Recent scores, at most `window_size` entries
    pub score_window: Vec<f64>,
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self {
            level: DifficultyLevel::Intermediate,
            turns_at_level: 0,
            last_change_turn: 0,
            change_reason: None,
            score_window: Vec::new(),
        }
    }
}

impl DifficultyState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Difficulty controller with hysteresis
#[derive(Debug, Clone)]
pub struct DifficultyAdapter {
    pub increase_threshold: f64,
    pub decrease_threshold: f64,
    pub min_turns_at_level: u32,
    pub window_size: usize,
}

impl Default for DifficultyAdapter {
    fn default() -> Self {
        Self {
            increase_threshold: 80.0,
            decrease_threshold: 50.0,
            min_turns_at_level: 2,
            window_size: 3,
        }
    }
}

impl DifficultyAdapter {
    pub fn initial_state(&self, starting_level: DifficultyLevel) -> DifficultyState {
        DifficultyState {
            level: starting_level,
            turns_at_level: 0,
            last_change_turn: 0,
            change_reason: Some("Initial level".to_string()),
            score_window: Vec::new(),
        }
    }

    /// Fold a new score into the state, possibly moving one level
    ///
    /// Eligibility is checked against the turns completed at the level
    /// before this one, so a change needs the window warm AND the level
    /// held for `min_turns_at_level` full turns. On change the turn counter
    /// resets and the window is preserved for continuity.
    pub fn update(&self, mut state: DifficultyState, new_score: f64, current_turn: u32) -> DifficultyState {
        state.score_window.push(new_score);
        if state.score_window.len() > self.window_size {
            let excess = state.score_window.len() - self.window_size;
            state.score_window.drain(..excess);
        }

        let eligible =
            state.score_window.len() >= 2 && state.turns_at_level >= self.min_turns_at_level;
        state.turns_at_level += 1;

        if !eligible {
            return state;
        }

        let avg: f64 = state.score_window.iter().sum::<f64>() / state.score_window.len() as f64;
        let trend = state.score_window[state.score_window.len() - 1] - state.score_window[0];

        let (new_level, reason) = if avg >= self.increase_threshold && trend >= 0.0 {
            (
                state.level.next_up(),
                format!("High performance (avg: {avg:.1}, trend: +{trend:.1})"),
            )
        } else if avg <= self.decrease_threshold && trend <= 0.0 {
            (
                state.level.next_down(),
                format!("Struggling (avg: {avg:.1}, trend: {trend:.1})"),
            )
        } else {
            return state;
        };

        if new_level == state.level {
            // Already at the end of the ladder
            return state;
        }

        tracing::info!(
            from = %state.level,
            to = %new_level,
            reason = %reason,
            "Difficulty change"
        );

        DifficultyState {
            level: new_level,
            turns_at_level: 0,
            last_change_turn: current_turn,
            change_reason: Some(reason),
            score_window: state.score_window,
        }
    }

    /// Recommended starting level for a stage
    pub fn level_for_stage(&self, stage: interview_agent_core::StageType) -> DifficultyLevel {
        match stage {
            interview_agent_core::StageType::Practice => DifficultyLevel::Foundational,
            _ => DifficultyLevel::Intermediate,
        }
    }

    /// Whether the interviewer should offer hints
    pub fn should_provide_hints(&self, state: &DifficultyState) -> bool {
        if state.level == DifficultyLevel::Foundational {
            return true;
        }
        if !state.score_window.is_empty() {
            let avg: f64 = state.score_window.iter().sum::<f64>() / state.score_window.len() as f64;
            return avg < 40.0;
        }
        false
    }

    /// Prompt block describing the current difficulty
    pub fn prompt_block(&self, state: &DifficultyState) -> String {
        format!(
            "CURRENT DIFFICULTY LEVEL: {}\n\n{}\n\nRecent performance: {}",
            state.level.as_str().to_uppercase(),
            state.level.question_guidance(),
            self.describe_performance(state)
        )
    }

    fn describe_performance(&self, state: &DifficultyState) -> String {
        if state.score_window.is_empty() {
            return "No data yet".to_string();
        }
        let avg: f64 = state.score_window.iter().sum::<f64>() / state.score_window.len() as f64;
        if avg >= 80.0 {
            format!("Excellent ({avg:.0}/100 avg)")
        } else if avg >= 60.0 {
            format!("Good ({avg:.0}/100 avg)")
        } else if avg >= 40.0 {
            format!("Fair ({avg:.0}/100 avg)")
        } else {
            format!("Struggling ({avg:.0}/100 avg)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_core::StageType;

    #[test]
    fn test_hysteresis_blocks_early_upgrade() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);

        state = adapter.update(state, 95.0, 1);
        assert_eq!(state.level, DifficultyLevel::Intermediate);

        state = adapter.update(state, 95.0, 2);
        assert_eq!(state.level, DifficultyLevel::Intermediate);
        assert_eq!(state.turns_at_level, 2);

        // Third high score crosses the hysteresis barrier
        state = adapter.update(state, 95.0, 3);
        assert_eq!(state.level, DifficultyLevel::Advanced);
        assert_eq!(state.turns_at_level, 0);
        assert_eq!(state.last_change_turn, 3);
        assert!(state.change_reason.as_deref().unwrap().contains("High performance"));
        // Window survives the change
        assert_eq!(state.score_window, vec![95.0, 95.0, 95.0]);
    }

    #[test]
    fn test_decrease_on_low_scores() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);

        for turn in 1..=3 {
            state = adapter.update(state, 30.0, turn);
        }
        assert_eq!(state.level, DifficultyLevel::Foundational);
        assert_eq!(state.turns_at_level, 0);
    }

    #[test]
    fn test_no_change_on_average_scores() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);

        for turn in 1..=6 {
            state = adapter.update(state, 65.0, turn);
        }
        assert_eq!(state.level, DifficultyLevel::Intermediate);
        assert_eq!(state.turns_at_level, 6);
    }

    #[test]
    fn test_single_step_moves_only() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);

        // Six excellent turns: at most two single-step changes, never a jump
        let mut levels = vec![state.level];
        for turn in 1..=6 {
            state = adapter.update(state, 100.0, turn);
            levels.push(state.level);
        }
        for pair in levels.windows(2) {
            let from = LADDER.iter().position(|l| *l == pair[0]).unwrap();
            let to = LADDER.iter().position(|l| *l == pair[1]).unwrap();
            assert!(to.abs_diff(from) <= 1);
        }
    }

    #[test]
    fn test_ladder_ends_are_sticky() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Expert);
        for turn in 1..=5 {
            state = adapter.update(state, 100.0, turn);
        }
        assert_eq!(state.level, DifficultyLevel::Expert);

        let mut state = adapter.initial_state(DifficultyLevel::Foundational);
        for turn in 1..=5 {
            state = adapter.update(state, 10.0, turn);
        }
        assert_eq!(state.level, DifficultyLevel::Foundational);
    }

    #[test]
    fn test_mixed_trend_blocks_change() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);

        // High average but falling trend: no upgrade
        state = adapter.update(state, 95.0, 1);
        state = adapter.update(state, 90.0, 2);
        state = adapter.update(state, 85.0, 3);
        assert_eq!(state.level, DifficultyLevel::Intermediate);
    }

    #[test]
    fn test_window_is_bounded() {
        let adapter = DifficultyAdapter {
            increase_threshold: 101.0, // never trigger
            ..Default::default()
        };
        let mut state = adapter.initial_state(DifficultyLevel::Intermediate);
        for turn in 1..=10 {
            state = adapter.update(state, 70.0, turn);
            assert!(state.score_window.len() <= adapter.window_size);
        }
    }

    #[test]
    fn test_level_for_stage() {
        let adapter = DifficultyAdapter::default();
        assert_eq!(adapter.level_for_stage(StageType::Hr), DifficultyLevel::Intermediate);
        assert_eq!(adapter.level_for_stage(StageType::Technical), DifficultyLevel::Intermediate);
        assert_eq!(adapter.level_for_stage(StageType::Behavioral), DifficultyLevel::Intermediate);
        assert_eq!(adapter.level_for_stage(StageType::Practice), DifficultyLevel::Foundational);
    }

    #[test]
    fn test_hints() {
        let adapter = DifficultyAdapter::default();
        let foundational = adapter.initial_state(DifficultyLevel::Foundational);
        assert!(adapter.should_provide_hints(&foundational));

        let mut struggling = adapter.initial_state(DifficultyLevel::Advanced);
        struggling.score_window = vec![30.0, 35.0];
        assert!(adapter.should_provide_hints(&struggling));

        let mut fine = adapter.initial_state(DifficultyLevel::Advanced);
        fine.score_window = vec![70.0, 75.0];
        assert!(!adapter.should_provide_hints(&fine));
    }

    #[test]
    fn test_state_json_roundtrip() {
        let state = DifficultyState {
            level: DifficultyLevel::Advanced,
            turns_at_level: 3,
            last_change_turn: 5,
            change_reason: Some("High performance".to_string()),
            score_window: vec![85.0, 90.0, 92.0],
        };
        let json = state.to_json().unwrap();
        assert!(json.contains("\"level\":\"advanced\""));
        let back = DifficultyState::from_json(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_prompt_block() {
        let adapter = DifficultyAdapter::default();
        let mut state = adapter.initial_state(DifficultyLevel::Advanced);
        state.score_window = vec![85.0];
        let block = adapter.prompt_block(&state);
        assert!(block.contains("CURRENT DIFFICULTY LEVEL: ADVANCED"));
        assert!(block.contains("edge cases"));
        assert!(block.contains("Excellent"));
    }
}
