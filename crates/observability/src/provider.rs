//! Observability provider interface

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{EvaluationResult, SpanType, TraceMetadata};

/// Abstract provider for observability operations
///
/// Implementations must handle their own transport errors: a provider call
/// may return an error for logging, but the service facade guarantees that
/// nothing propagates to business logic.
#[async_trait]
pub trait ObservabilityProvider: Send + Sync {
    /// Whether the provider is configured and usable
    fn is_enabled(&self) -> bool;

    /// Start a session-level trace; returns the trace ID
    async fn start_trace(&self, name: &str, metadata: TraceMetadata) -> Option<String>;

    /// End a trace with optional output and error
    async fn end_trace(
        &self,
        trace_id: &str,
        output: Option<Value>,
        error: Option<String>,
    ) -> bool;

    /// Start a span within a trace; returns the span ID
    async fn start_span(
        &self,
        name: &str,
        trace_id: Option<&str>,
        span_type: SpanType,
        input: Option<Value>,
        metadata: Option<TraceMetadata>,
    ) -> Option<String>;

    /// End a span with optional output and error
    async fn end_span(&self, span_id: &str, output: Option<Value>, error: Option<String>) -> bool;

    /// Log an LLM call as a span; prompt and response are truncated by the
    /// provider before leaving the process
    #[allow(clippy::too_many_arguments)]
    async fn log_llm_call(
        &self,
        trace_id: Option<&str>,
        model: &str,
        input_prompt: &str,
        output_response: &str,
        metadata: Option<HashMap<String, Value>>,
        latency_ms: Option<f64>,
        tokens_used: Option<usize>,
    ) -> Option<String>;

    /// Record a metric as a feedback score on the trace
    async fn record_metric(
        &self,
        metric_name: &str,
        value: f64,
        trace_id: Option<&str>,
        metadata: Option<HashMap<String, Value>>,
    ) -> bool;

    /// Submit an evaluation: per-metric scores plus `<evaluator>_overall`
    async fn submit_evaluation(&self, evaluation: &EvaluationResult) -> bool;

    /// Flush any pending data
    async fn flush(&self) -> bool;

    /// Gracefully shut down the provider
    async fn shutdown(&self) -> bool;
}

/// Null implementation for the disabled state
///
/// Substituted silently when configuration is absent or initialization
/// fails; every method is a successful no-op.
#[derive(Debug, Clone, Default)]
pub struct NullProvider;

#[async_trait]
impl ObservabilityProvider for NullProvider {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn start_trace(&self, _name: &str, _metadata: TraceMetadata) -> Option<String> {
        None
    }

    async fn end_trace(
        &self,
        _trace_id: &str,
        _output: Option<Value>,
        _error: Option<String>,
    ) -> bool {
        true
    }

    async fn start_span(
        &self,
        _name: &str,
        _trace_id: Option<&str>,
        _span_type: SpanType,
        _input: Option<Value>,
        _metadata: Option<TraceMetadata>,
    ) -> Option<String> {
        None
    }

    async fn end_span(
        &self,
        _span_id: &str,
        _output: Option<Value>,
        _error: Option<String>,
    ) -> bool {
        true
    }

    async fn log_llm_call(
        &self,
        _trace_id: Option<&str>,
        _model: &str,
        _input_prompt: &str,
        _output_response: &str,
        _metadata: Option<HashMap<String, Value>>,
        _latency_ms: Option<f64>,
        _tokens_used: Option<usize>,
    ) -> Option<String> {
        None
    }

    async fn record_metric(
        &self,
        _metric_name: &str,
        _value: f64,
        _trace_id: Option<&str>,
        _metadata: Option<HashMap<String, Value>>,
    ) -> bool {
        true
    }

    async fn submit_evaluation(&self, _evaluation: &EvaluationResult) -> bool {
        true
    }

    async fn flush(&self) -> bool {
        true
    }

    async fn shutdown(&self) -> bool {
        true
    }
}
