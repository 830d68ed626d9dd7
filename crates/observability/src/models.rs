//! Observability data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Type of span for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanType {
    LlmCall,
    Function,
    Session,
    Evaluation,
}

impl SpanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanType::LlmCall => "llm_call",
            SpanType::Function => "function",
            SpanType::Session => "session",
            SpanType::Evaluation => "evaluation",
        }
    }
}

/// Metadata attached to traces and spans
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, Value>,
}

impl TraceMetadata {
    pub fn for_session(
        session_id: impl Into<String>,
        stage_type: impl Into<String>,
        job_role: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            session_id: Some(session_id.into()),
            stage_type: Some(stage_type.into()),
            job_role: Some(job_role.into()),
            language: Some(language.into()),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Score from one evaluation metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationScore {
    pub metric_name: String,
    /// 0.0 to 1.0
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Complete evaluation result for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// e.g. "geval"
    pub evaluator: String,
    pub scores: Vec<EvaluationScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub evaluated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl EvaluationResult {
    pub fn new(session_id: impl Into<String>, evaluator: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            evaluator: evaluator.into(),
            scores: Vec::new(),
            overall_score: None,
            summary: None,
            evaluated_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = TraceMetadata::for_session("s1", "technical", "Backend Developer", "en")
            .with_component("scoring_engine")
            .with_extra("turn", serde_json::json!(3));
        assert_eq!(meta.session_id.as_deref(), Some("s1"));
        assert_eq!(meta.component.as_deref(), Some("scoring_engine"));
        assert_eq!(meta.extra["turn"], 3);
    }

    #[test]
    fn test_metadata_serializes_sparsely() {
        let meta = TraceMetadata::default();
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, "{}");
    }
}
