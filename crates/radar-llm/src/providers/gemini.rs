//! Google Gemini provider implementation
//!
//! This module implements the LLMProvider trait for Google's Gemini models.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Example
//!
//! ```no_run
//! use radar_llm::{CompletionRequest, LLMProvider};
//! use radar_llm::providers::GeminiProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create provider from GEMINI_API_KEY environment variable
//!     let provider = GeminiProvider::from_env()?;
//!
//!     let request = CompletionRequest::prompt("gemini-2.5-flash", "Olá!");
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GEMINI_API_KEY`.
    /// Optionally reads base URL from `GEMINI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Google Gemini provider
///
/// Supports the text models of the `generateContent` API, e.g.
/// - gemini-2.5-flash
/// - gemini-2.5-pro
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new Gemini provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API");

        if request.messages.is_empty() {
            return Err(LLMError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        }

        let model = request.model.clone();
        let gemini_request = GenerateContentRequest::from(request);

        let response = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status.as_u16(), error_text, &model));
        }

        let gemini_response: GenerateContentResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let completion = gemini_response.into_completion()?;

        debug!(
            "Received response - stop_reason: {:?}, tokens: {}/{}",
            completion.stop_reason, completion.usage.input_tokens, completion.usage.output_tokens
        );

        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini-specific request/response types
// These match the generateContent wire format

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl From<CompletionRequest> for GenerateContentRequest {
    fn from(request: CompletionRequest) -> Self {
        let contents = request
            .messages
            .into_iter()
            .map(|message| Content {
                role: Some(
                    match message.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: Some(message.content),
                }],
            })
            .collect();

        let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            })
        } else {
            None
        };

        Self {
            contents,
            generation_config,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let usage = self
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = self.candidates.into_iter().next() else {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                debug!("Prompt blocked: {reason}");
                return Ok(CompletionResponse {
                    message: Message::assistant(String::new()),
                    stop_reason: StopReason::Blocked,
                    usage,
                });
            }
            return Err(LLMError::UnexpectedResponse(
                "No candidates in response".to_string(),
            ));
        };

        // Gemini splits long answers into several text parts
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let stop_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT") => {
                StopReason::Blocked
            }
            Some("STOP") | None => StopReason::EndTurn,
            Some(other) => {
                debug!("Unknown finish reason: {other}");
                StopReason::EndTurn
            }
        };

        Ok(CompletionResponse {
            message: Message::assistant(text),
            stop_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = tokio_test::assert_ok!(GeminiProvider::new("test-key"));
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            GeminiProvider::new("  "),
            Err(LLMError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let provider =
            GeminiProvider::with_config(GeminiConfig::new("k").with_api_base("http://localhost/v1/"))
                .unwrap();
        assert_eq!(
            provider.endpoint("gemini-2.5-flash"),
            "http://localhost/v1/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest::builder("gemini-2.5-flash")
            .add_message(Message::user("Olá"))
            .temperature(Some(0.2))
            .max_tokens(Some(1024))
            .build();

        let body = serde_json::to_value(GenerateContentRequest::from(request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Olá");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_prompt_only_request_has_no_generation_config() {
        let request = CompletionRequest::prompt("gemini-2.5-flash", "Olá");
        let body = serde_json::to_value(GenerateContentRequest::from(request)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_joins_text_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```json\n["}, {"text": "]\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion().unwrap();

        assert_eq!(completion.text(), Some("```json\n[]\n```"));
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.total(), 16);
    }

    #[test]
    fn test_blocked_prompt() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion().unwrap();

        assert_eq!(completion.stop_reason, StopReason::Blocked);
        assert_eq!(completion.text(), None);
    }

    #[test]
    fn test_missing_candidates_is_error() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            response.into_completion(),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_from_env_without_key() {
        // SAFETY: This is a test that modifies env vars, which is safe in single-threaded test context
        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
        }
        assert!(GeminiProvider::from_env().is_err());
    }
}
