//! AI narrative step
//!
//! Sends the aggregated quotes to a generative model and turns its reply into
//! [`Recommendation`]s. Neither the model call nor the parsing raises: a
//! failed call becomes [`ERROR_PLACEHOLDER`], which then fails parsing and
//! degrades to an empty list, keeping the dashboard renderable.

use crate::config::MarketConfig;
use crate::error::Result;
use crate::prompts::render_recommendation_prompt;
use crate::quote::QuoteMap;
use crate::recommendation::Recommendation;
use radar_llm::{CompletionRequest, LLMProvider, Message};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, info, warn};

/// Text used in place of the completion when the model call fails
pub const ERROR_PLACEHOLDER: &str = "Erro ao gerar conteudo";

/// Text used in place of the completion when the model answers nothing
pub const EMPTY_PLACEHOLDER: &str = "API não retornou texto.";

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?\n?").expect("valid fence regex"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```$").expect("valid fence regex"));

/// Remove markdown code-fence markers around a model reply
///
/// Only applies when the trimmed text starts with a fence; the text is
/// returned trimmed otherwise.
pub fn strip_code_fence(text: &str) -> String {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }

    let without_opening = OPENING_FENCE.replace(cleaned, "");
    CLOSING_FENCE.replace(&without_opening, "").into_owned()
}

/// Result of interpreting a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A non-empty list of recommendations
    Recommendations(Vec<Recommendation>),
    /// A well-formed but empty array
    Empty,
    /// The reply is not a JSON array of recommendations
    Malformed { raw: String, reason: String },
}

impl ParseOutcome {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Recommendations, or an empty list for `Empty` and `Malformed`
    pub fn into_recommendations(self) -> Vec<Recommendation> {
        match self {
            Self::Recommendations(recs) => recs,
            Self::Empty | Self::Malformed { .. } => Vec::new(),
        }
    }
}

/// Parse a model reply into recommendations, never failing
pub fn parse_recommendations(text: &str) -> ParseOutcome {
    let cleaned = strip_code_fence(text);

    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => return malformed(text, format!("invalid JSON: {e}")),
    };

    let serde_json::Value::Array(items) = value else {
        return malformed(text, "response is not an array".to_string());
    };

    if items.is_empty() {
        return ParseOutcome::Empty;
    }

    match serde_json::from_value::<Vec<Recommendation>>(serde_json::Value::Array(items)) {
        Ok(recs) => ParseOutcome::Recommendations(recs),
        Err(e) => malformed(text, format!("unexpected record shape: {e}")),
    }
}

fn malformed(raw: &str, reason: String) -> ParseOutcome {
    warn!(reason = %reason, raw = %raw, "Could not parse model recommendations");
    ParseOutcome::Malformed {
        raw: raw.to_string(),
        reason,
    }
}

/// Asks a generative model for buy/sell recommendations
#[derive(Clone)]
pub struct NarrativeGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

impl NarrativeGenerator {
    /// Create a generator for a provider and model
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Generator using the model and sampling settings of a [`MarketConfig`]
    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &MarketConfig) -> Self {
        Self::new(provider, config.model.clone())
            .with_sampling(config.temperature, config.max_output_tokens)
    }

    /// Override the provider's sampling defaults; `None` keeps them
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<usize>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw completion text for a prompt, or a placeholder on failure
    pub async fn generate_text(&self, prompt: String) -> String {
        let request = CompletionRequest::builder(self.model.clone())
            .add_message(Message::user(prompt))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    "Completion from {} used {} tokens",
                    self.provider.name(),
                    response.usage.total()
                );
                response
                    .text()
                    .map_or_else(|| EMPTY_PLACEHOLDER.to_string(), str::to_string)
            }
            Err(e) => {
                error!("Model call to {} failed: {e}", self.provider.name());
                ERROR_PLACEHOLDER.to_string()
            }
        }
    }

    /// Recommendations for the aggregated quotes
    ///
    /// Only prompt rendering can return an error; model and parse failures
    /// are folded into the outcome.
    pub async fn recommend(&self, quotes: &QuoteMap) -> Result<ParseOutcome> {
        let prompt = render_recommendation_prompt(quotes)?;
        info!(
            "Requesting recommendations for {} symbols from {}",
            quotes.len(),
            self.model
        );

        let text = self.generate_text(prompt).await;
        let outcome = parse_recommendations(&text);

        if let ParseOutcome::Recommendations(recs) = &outcome {
            for rec in recs.iter().filter(|r| !r.is_consistent()) {
                warn!(
                    ticker = %rec.ticker,
                    "Recommendation pairs {} with {}",
                    rec.direction,
                    rec.status
                );
            }
        }

        Ok(outcome)
    }
}
