//! Opik provider
//!
//! Posts traces, spans, and feedback scores to the Opik REST API. Every
//! request is best-effort: transport failures are logged at debug level and
//! reported as unsuccessful, never raised.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use interview_agent_config::ObservabilitySettings;

use crate::models::{EvaluationResult, SpanType, TraceMetadata};
use crate::provider::ObservabilityProvider;
use crate::{truncate_chars, LLM_LOG_TRUNCATE_CHARS};

/// Opik REST provider
pub struct OpikProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    workspace: String,
    project_name: String,
    enabled: bool,
}

impl OpikProvider {
    /// Build from settings; an absent API key yields a disabled provider
    /// (callers substitute `NullProvider`).
    pub fn new(settings: &ObservabilitySettings) -> Self {
        let enabled = settings.enabled && !settings.api_key.is_empty();
        if settings.enabled && settings.api_key.is_empty() {
            tracing::warn!("Opik enabled without an API key; tracing disabled");
        }

        Self {
            client: Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            workspace: settings.workspace.clone(),
            project_name: settings.project_name.clone(),
            enabled,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/private{path}", self.endpoint)
    }

    /// POST a JSON payload; returns false on any failure
    async fn post(&self, path: &str, body: Value) -> bool {
        let result = self
            .client
            .post(self.url(path))
            .header("authorization", &self.api_key)
            .header("Comet-Workspace", &self.workspace)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(path, status = %response.status(), "Opik request rejected");
                false
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "Opik request failed");
                false
            }
        }
    }

    async fn patch(&self, path: &str, body: Value) -> bool {
        let result = self
            .client
            .patch(self.url(path))
            .header("authorization", &self.api_key)
            .header("Comet-Workspace", &self.workspace)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(path, status = %response.status(), "Opik request rejected");
                false
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "Opik request failed");
                false
            }
        }
    }

    async fn put_feedback_scores(&self, trace_id: &str, scores: Vec<Value>) -> bool {
        let result = self
            .client
            .put(self.url(&format!("/traces/{trace_id}/feedback-scores")))
            .header("authorization", &self.api_key)
            .header("Comet-Workspace", &self.workspace)
            .json(&json!({ "scores": scores }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(trace_id, status = %response.status(), "Opik feedback rejected");
                false
            }
            Err(e) => {
                tracing::debug!(trace_id, error = %e, "Opik feedback failed");
                false
            }
        }
    }
}

#[async_trait]
impl ObservabilityProvider for OpikProvider {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn start_trace(&self, name: &str, metadata: TraceMetadata) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let trace_id = Uuid::new_v4().to_string();
        let ok = self
            .post(
                "/traces",
                json!({
                    "id": trace_id,
                    "name": name,
                    "project_name": self.project_name,
                    "start_time": Utc::now().to_rfc3339(),
                    "metadata": metadata,
                }),
            )
            .await;

        ok.then_some(trace_id)
    }

    async fn end_trace(&self, trace_id: &str, output: Option<Value>, error: Option<String>) -> bool {
        if !self.enabled {
            return true;
        }

        let mut body = json!({ "end_time": Utc::now().to_rfc3339() });
        if let Some(output) = output {
            body["output"] = output;
        }
        if let Some(error) = error {
            body["metadata"] = json!({ "error": error });
        }

        self.patch(&format!("/traces/{trace_id}"), body).await
    }

    async fn start_span(
        &self,
        name: &str,
        trace_id: Option<&str>,
        span_type: SpanType,
        input: Option<Value>,
        metadata: Option<TraceMetadata>,
    ) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let span_id = Uuid::new_v4().to_string();
        let mut body = json!({
            "id": span_id,
            "name": name,
            "type": span_type.as_str(),
            "project_name": self.project_name,
            "start_time": Utc::now().to_rfc3339(),
        });
        if let Some(trace_id) = trace_id {
            body["trace_id"] = json!(trace_id);
        }
        if let Some(input) = input {
            body["input"] = input;
        }
        if let Some(metadata) = metadata {
            body["metadata"] = serde_json::to_value(metadata).unwrap_or(Value::Null);
        }

        self.post("/spans", body).await.then_some(span_id)
    }

    async fn end_span(&self, span_id: &str, output: Option<Value>, error: Option<String>) -> bool {
        if !self.enabled {
            return true;
        }

        let mut body = json!({ "end_time": Utc::now().to_rfc3339() });
        if let Some(output) = output {
            body["output"] = output;
        }
        if let Some(error) = error {
            body["metadata"] = json!({ "error": error });
        }

        self.patch(&format!("/spans/{span_id}"), body).await
    }

    async fn log_llm_call(
        &self,
        trace_id: Option<&str>,
        model: &str,
        input_prompt: &str,
        output_response: &str,
        metadata: Option<HashMap<String, Value>>,
        latency_ms: Option<f64>,
        tokens_used: Option<usize>,
    ) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let span_id = Uuid::new_v4().to_string();
        let mut meta = metadata.unwrap_or_default();
        meta.insert("model".to_string(), json!(model));
        if let Some(latency) = latency_ms {
            meta.insert("latency_ms".to_string(), json!(latency));
        }
        if let Some(tokens) = tokens_used {
            meta.insert("tokens_used".to_string(), json!(tokens));
        }

        let mut body = json!({
            "id": span_id,
            "name": format!("llm_{model}"),
            "type": SpanType::LlmCall.as_str(),
            "project_name": self.project_name,
            "start_time": Utc::now().to_rfc3339(),
            "end_time": Utc::now().to_rfc3339(),
            "input": { "prompt": truncate_chars(input_prompt, LLM_LOG_TRUNCATE_CHARS) },
            "output": { "response": truncate_chars(output_response, LLM_LOG_TRUNCATE_CHARS) },
            "metadata": meta,
        });
        if let Some(trace_id) = trace_id {
            body["trace_id"] = json!(trace_id);
        }

        self.post("/spans", body).await.then_some(span_id)
    }

    async fn record_metric(
        &self,
        metric_name: &str,
        value: f64,
        trace_id: Option<&str>,
        metadata: Option<HashMap<String, Value>>,
    ) -> bool {
        if !self.enabled {
            return true;
        }

        let Some(trace_id) = trace_id else {
            tracing::debug!(metric_name, "Metric dropped: no trace to attach to");
            return false;
        };

        let mut score = json!({
            "name": metric_name,
            "value": value,
            "source": "sdk",
        });
        if let Some(metadata) = metadata {
            if let Some(reason) = metadata.get("reason").and_then(|v| v.as_str()) {
                score["reason"] = json!(reason);
            }
        }

        self.put_feedback_scores(trace_id, vec![score]).await
    }

    async fn submit_evaluation(&self, evaluation: &EvaluationResult) -> bool {
        if !self.enabled {
            return true;
        }

        let Some(trace_id) = evaluation.trace_id.as_deref() else {
            tracing::debug!(
                session_id = %evaluation.session_id,
                "Evaluation dropped: no trace to attach to"
            );
            return false;
        };

        let mut scores: Vec<Value> = evaluation
            .scores
            .iter()
            .map(|s| {
                let mut score = json!({
                    "name": s.metric_name,
                    "value": s.score,
                    "source": "sdk",
                });
                if let Some(reason) = &s.reason {
                    score["reason"] = json!(reason);
                }
                score
            })
            .collect();

        if let Some(overall) = evaluation.overall_score {
            scores.push(json!({
                "name": format!("{}_overall", evaluation.evaluator),
                "value": overall,
                "source": "sdk",
            }));
        }

        self.put_feedback_scores(trace_id, scores).await
    }

    async fn flush(&self) -> bool {
        // Requests are sent synchronously; nothing buffered to flush.
        true
    }

    async fn shutdown(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_settings() -> ObservabilitySettings {
        ObservabilitySettings {
            enabled: false,
            api_key: String::new(),
            workspace: "default".to_string(),
            project_name: "ai-interviewer".to_string(),
            endpoint: "http://localhost:1".to_string(),
        }
    }

    #[test]
    fn test_enabled_requires_api_key() {
        let mut settings = disabled_settings();
        settings.enabled = true;
        let provider = OpikProvider::new(&settings);
        assert!(!provider.is_enabled());

        settings.api_key = "key".to_string();
        let provider = OpikProvider::new(&settings);
        assert!(provider.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_provider_is_noop() {
        let provider = OpikProvider::new(&disabled_settings());
        assert!(provider
            .start_trace("t", TraceMetadata::default())
            .await
            .is_none());
        assert!(provider.end_trace("id", None, None).await);
        assert!(provider.record_metric("m", 1.0, Some("id"), None).await);
    }
}
