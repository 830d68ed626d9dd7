//! Observability service facade
//!
//! Single point of access for trace, span, metric, and evaluation
//! operations. Owns the session -> trace registry used by background tasks
//! to re-attach to their session's trace.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use interview_agent_config::ObservabilitySettings;

use crate::models::{EvaluationResult, SpanType, TraceMetadata};
use crate::opik::OpikProvider;
use crate::provider::{NullProvider, ObservabilityProvider};

/// Unified observability facade
///
/// Wraps the active provider and guarantees no call raises: failures are
/// logged and converted to neutral return values.
pub struct ObservabilityService {
    provider: Arc<dyn ObservabilityProvider>,
    /// session_id -> trace_id; task-local context does not survive spawn
    /// boundaries, so detached tasks look their trace up here
    session_traces: DashMap<String, String>,
}

impl ObservabilityService {
    /// Build from settings; disabled or misconfigured observability yields
    /// the null provider.
    pub fn from_settings(settings: &ObservabilitySettings) -> Self {
        if !settings.enabled {
            tracing::info!("Observability disabled");
            return Self::disabled();
        }

        let provider = OpikProvider::new(settings);
        if provider.is_enabled() {
            tracing::info!("Observability initialized with Opik provider");
            Self::with_provider(Arc::new(provider))
        } else {
            tracing::warn!("Opik provider unavailable, using null provider");
            Self::disabled()
        }
    }

    pub fn with_provider(provider: Arc<dyn ObservabilityProvider>) -> Self {
        Self {
            provider,
            session_traces: DashMap::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::with_provider(Arc::new(NullProvider))
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_enabled()
    }

    // ==================== Session registry ====================

    /// Register a session -> trace mapping
    pub fn register_session_trace(&self, session_id: &str, trace_id: &str) {
        if !session_id.is_empty() && !trace_id.is_empty() {
            self.session_traces
                .insert(session_id.to_string(), trace_id.to_string());
        }
    }

    /// Remove a session from the registry
    pub fn unregister_session_trace(&self, session_id: &str) {
        self.session_traces.remove(session_id);
    }

    /// Trace ID for a session; readers tolerate missing entries
    pub fn trace_for_session(&self, session_id: &str) -> Option<String> {
        self.session_traces
            .get(session_id)
            .map(|t| t.value().clone())
    }

    // ==================== Traces and spans ====================

    pub async fn start_trace(&self, name: &str, metadata: TraceMetadata) -> Option<String> {
        self.provider.start_trace(name, metadata).await
    }

    pub async fn end_trace(
        &self,
        trace_id: &str,
        output: Option<Value>,
        error: Option<String>,
    ) -> bool {
        if trace_id.is_empty() {
            return true;
        }
        self.provider.end_trace(trace_id, output, error).await
    }

    pub async fn start_span(
        &self,
        name: &str,
        trace_id: Option<&str>,
        span_type: SpanType,
        input: Option<Value>,
        metadata: Option<TraceMetadata>,
    ) -> Option<String> {
        self.provider
            .start_span(name, trace_id, span_type, input, metadata)
            .await
    }

    pub async fn end_span(&self, span_id: &str, output: Option<Value>, error: Option<String>) -> bool {
        if span_id.is_empty() {
            return true;
        }
        self.provider.end_span(span_id, output, error).await
    }

    // ==================== LLM logging ====================

    #[allow(clippy::too_many_arguments)]
    pub async fn log_llm_call(
        &self,
        trace_id: Option<&str>,
        model: &str,
        input_prompt: &str,
        output_response: &str,
        metadata: Option<HashMap<String, Value>>,
        latency_ms: Option<f64>,
        tokens_used: Option<usize>,
    ) -> Option<String> {
        self.provider
            .log_llm_call(
                trace_id,
                model,
                input_prompt,
                output_response,
                metadata,
                latency_ms,
                tokens_used,
            )
            .await
    }

    // ==================== Metrics and evaluations ====================

    pub async fn record_metric(
        &self,
        metric_name: &str,
        value: f64,
        trace_id: Option<&str>,
        metadata: Option<HashMap<String, Value>>,
    ) -> bool {
        self.provider
            .record_metric(metric_name, value, trace_id, metadata)
            .await
    }

    pub async fn submit_evaluation(&self, evaluation: &EvaluationResult) -> bool {
        self.provider.submit_evaluation(evaluation).await
    }

    // ==================== Lifecycle ====================

    pub async fn flush(&self) -> bool {
        self.provider.flush().await
    }

    pub async fn shutdown(&self) -> bool {
        self.provider.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_registry() {
        let service = ObservabilityService::disabled();
        service.register_session_trace("s1", "t1");
        assert_eq!(service.trace_for_session("s1").as_deref(), Some("t1"));
        assert!(service.trace_for_session("missing").is_none());

        service.unregister_session_trace("s1");
        assert!(service.trace_for_session("s1").is_none());
    }

    #[test]
    fn test_registry_ignores_empty_keys() {
        let service = ObservabilityService::disabled();
        service.register_session_trace("", "t1");
        service.register_session_trace("s1", "");
        assert!(service.trace_for_session("").is_none());
        assert!(service.trace_for_session("s1").is_none());
    }

    #[tokio::test]
    async fn test_disabled_service_never_fails() {
        let service = ObservabilityService::disabled();
        assert!(!service.is_enabled());
        assert!(service
            .start_trace("t", TraceMetadata::default())
            .await
            .is_none());
        assert!(service.end_trace("", None, None).await);
        assert!(service.record_metric("m", 0.5, None, None).await);
        assert!(service.flush().await);
    }
}
