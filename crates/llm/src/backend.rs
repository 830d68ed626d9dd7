//! Language model trait and generation results

use crate::json::clean_json_response;
use crate::LlmError;
use async_trait::async_trait;

/// Result of a single generation call
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated, when the API reports them
    pub tokens: usize,
    /// Total call latency (ms)
    pub latency_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Error,
}

/// Language model backend
///
/// Calls are single-attempt: transient failures surface as errors and the
/// caller falls back to neutral output. There is no retry loop.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate free-form text
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, LlmError>;

    /// Generate with JSON-mode output and parse the result
    ///
    /// The default implementation reuses `generate` and strips markdown
    /// fences; backends with a native JSON mode override this.
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, LlmError> {
        let result = self.generate(prompt).await?;
        let cleaned = clean_json_response(&result.text);
        serde_json::from_str(cleaned).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Model name for logging and trace metadata
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticLlm;

    #[tokio::test]
    async fn test_generate_json_strips_fences() {
        let llm = StaticLlm::with_responses(vec!["```json\n{\"score\": 75}\n```".to_string()]);
        let value = llm.generate_json("prompt").await.unwrap();
        assert_eq!(value["score"], 75);
    }

    #[tokio::test]
    async fn test_generate_json_rejects_garbage() {
        let llm = StaticLlm::with_responses(vec!["not json at all".to_string()]);
        let err = llm.generate_json("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
