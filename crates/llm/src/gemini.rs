//! Gemini HTTP backend

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{FinishReason, GenerationResult, LanguageModel};
use crate::json::clean_json_response;
use crate::LlmError;

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model ID, e.g. "gemini-2.5-flash"
    pub model: String,
    /// API key (GOOGLE_API_KEY)
    pub api_key: String,
    /// API endpoint
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Gemini generateContent backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        // Model IDs may arrive with a "models/" prefix from config; normalize.
        let model = self.config.model.trim_start_matches("models/");
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, model
        )
    }

    async fn execute(&self, prompt: &str, json_mode: bool) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: json_mode.then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {status}: {body}")));
            }
            return Err(LlmError::Api(format!("{status}: {body}")));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("STOP") | None => FinishReason::Stop,
            Some(_) => FinishReason::Error,
        };

        Ok(GenerationResult {
            text,
            tokens: body
                .usage_metadata
                .map(|u| u.candidates_token_count)
                .unwrap_or(0),
            latency_ms: start.elapsed().as_millis() as u64,
            finish_reason,
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, LlmError> {
        self.execute(prompt, false).await
    }

    /// Uses the native JSON response mode; fences are still stripped as a
    /// tolerance measure for models that ignore the mime-type hint.
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, LlmError> {
        let result = self.execute(prompt, true).await?;
        let cleaned = clean_json_response(&result.text);
        serde_json::from_str(cleaned).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: usize,
}
