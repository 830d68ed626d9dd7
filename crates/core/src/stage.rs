//! Interview stages

use serde::{Deserialize, Serialize};

/// Stage of the interview pipeline
///
/// The standard application flow runs `Hr -> Technical -> Behavioral`.
/// `Practice` is a standalone one-off session outside that flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    #[default]
    Hr,
    Technical,
    Behavioral,
    Practice,
}

/// Ordered application stages; practice sessions sit outside this flow
pub const STAGE_ORDER: [StageType; 3] = [StageType::Hr, StageType::Technical, StageType::Behavioral];

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::Hr => "hr",
            StageType::Technical => "technical",
            StageType::Behavioral => "behavioral",
            StageType::Practice => "practice",
        }
    }

    /// Parse from a stored string, defaulting to HR for unknown values
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "technical" => StageType::Technical,
            "behavioral" => StageType::Behavioral,
            "practice" => StageType::Practice,
            _ => StageType::Hr,
        }
    }

    /// Stages that precede this one in the application flow
    ///
    /// Practice sessions have no predecessors. Used to scope cross-stage
    /// memory lookups to earlier rounds only.
    pub fn preceding_stages(&self) -> Vec<StageType> {
        match STAGE_ORDER.iter().position(|s| s == self) {
            Some(idx) => STAGE_ORDER[..idx].to_vec(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default() {
        assert_eq!(StageType::parse_or_default("technical"), StageType::Technical);
        assert_eq!(StageType::parse_or_default("PRACTICE"), StageType::Practice);
        assert_eq!(StageType::parse_or_default("unknown"), StageType::Hr);
    }

    #[test]
    fn test_preceding_stages() {
        assert!(StageType::Hr.preceding_stages().is_empty());
        assert_eq!(StageType::Technical.preceding_stages(), vec![StageType::Hr]);
        assert_eq!(
            StageType::Behavioral.preceding_stages(),
            vec![StageType::Hr, StageType::Technical]
        );
        assert!(StageType::Practice.preceding_stages().is_empty());
    }

    #[test]
    fn test_serde_format() {
        assert_eq!(serde_json::to_string(&StageType::Technical).unwrap(), "\"technical\"");
    }
}
