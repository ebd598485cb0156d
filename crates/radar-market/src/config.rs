//! Configuration for market data operations

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default brapi.dev host
pub const DEFAULT_API_BASE: &str = "https://brapi.dev";

/// Default generative model for recommendations
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const MAX_RETRIES_LIMIT: u32 = 2;

/// Configuration for market data operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Base URL of the quote provider
    pub api_base: String,

    /// Provider API token (`BRAPI_API_KEY`)
    pub api_token: Option<String>,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Retries after the first attempt of a quote request
    pub max_retries: u32,

    /// Fixed pause between attempts
    pub retry_delay: Duration,

    /// Client-side request cap, `None` for no limit
    pub rate_limit_per_minute: Option<u32>,

    /// Symbols requested per listing page
    pub listing_page_size: u32,

    /// Listing page (1-based)
    pub listing_page: u32,

    /// How long a listing response may be reused by an HTTP cache in front of us
    pub listing_revalidate: Duration,

    /// Quote modules requested per symbol; the free tier allows one
    pub quote_modules: Vec<String>,

    /// Generative model used for recommendations
    pub model: String,

    /// Sampling temperature for recommendations, provider default if `None`
    pub temperature: Option<f32>,

    /// Output cap for recommendations, provider default if `None`
    pub max_output_tokens: Option<usize>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
            rate_limit_per_minute: None,
            listing_page_size: 3,
            listing_page: 1,
            listing_revalidate: Duration::from_secs(180),
            quote_modules: vec!["summaryProfile".to_string()],
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Load configuration from environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .with_env_api_key()
            .with_env_api_base()
            .with_env_rate_limit()?
            .from_env_model()
            .with_env_sampling()?
            .build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(MarketError::ConfigError(
                "api_base must not be empty".to_string(),
            ));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(MarketError::ConfigError(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}"
            )));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(MarketError::ConfigError(format!(
                    "temperature must be between 0.0 and 2.0, got {temperature}"
                )));
            }
        }

        if self.max_output_tokens == Some(0) {
            return Err(MarketError::ConfigError(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.listing_page_size == 0 || self.listing_page == 0 {
            return Err(MarketError::ConfigError(
                "listing page and page size start at 1".to_string(),
            ));
        }

        if self.rate_limit_per_minute == Some(0) {
            return Err(MarketError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Total attempts per quote request (first try plus retries)
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    api_base: Option<String>,
    api_token: Option<String>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    listing_page_size: Option<u32>,
    listing_page: Option<u32>,
    model: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<usize>,
}

impl MarketConfigBuilder {
    /// Set the provider base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the provider API token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the pause between attempts
    pub fn retry_delay(mut self, duration: Duration) -> Self {
        self.retry_delay = Some(duration);
        self
    }

    /// Cap outgoing requests per minute
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set listing page size
    pub fn listing_page_size(mut self, size: u32) -> Self {
        self.listing_page_size = Some(size);
        self
    }

    /// Set listing page
    pub fn listing_page(mut self, page: u32) -> Self {
        self.listing_page = Some(page);
        self
    }

    /// Set the generative model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature for recommendations
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the length of generated recommendations
    pub fn max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Load the provider token from `BRAPI_API_KEY`
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("BRAPI_API_KEY") {
            if !key.trim().is_empty() {
                self.api_token = Some(key);
            }
        }
        self
    }

    /// Load the provider base URL from `BRAPI_API_BASE`
    pub fn with_env_api_base(mut self) -> Self {
        if let Ok(base) = std::env::var("BRAPI_API_BASE") {
            self.api_base = Some(base);
        }
        self
    }

    /// Load the request cap from `BRAPI_RATE_LIMIT`
    pub fn with_env_rate_limit(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var("BRAPI_RATE_LIMIT") {
            let limit = raw.trim().parse().map_err(|_| {
                MarketError::ConfigError(format!("BRAPI_RATE_LIMIT is not a number: {raw}"))
            })?;
            self.rate_limit_per_minute = Some(limit);
        }
        Ok(self)
    }

    /// Load the model name from `GEMINI_MODEL`
    pub fn from_env_model(mut self) -> Self {
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.model = Some(model);
        }
        self
    }

    /// Load `GEMINI_TEMPERATURE` and `GEMINI_MAX_TOKENS`
    pub fn with_env_sampling(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var("GEMINI_TEMPERATURE") {
            let temperature = raw.trim().parse().map_err(|_| {
                MarketError::ConfigError(format!("GEMINI_TEMPERATURE is not a number: {raw}"))
            })?;
            self.temperature = Some(temperature);
        }
        if let Ok(raw) = std::env::var("GEMINI_MAX_TOKENS") {
            let tokens = raw.trim().parse().map_err(|_| {
                MarketError::ConfigError(format!("GEMINI_MAX_TOKENS is not a number: {raw}"))
            })?;
            self.max_output_tokens = Some(tokens);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            api_token: self.api_token,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_delay: self.retry_delay.unwrap_or(defaults.retry_delay),
            rate_limit_per_minute: self.rate_limit_per_minute,
            listing_page_size: self.listing_page_size.unwrap_or(defaults.listing_page_size),
            listing_page: self.listing_page.unwrap_or(defaults.listing_page),
            listing_revalidate: defaults.listing_revalidate,
            quote_modules: defaults.quote_modules,
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.listing_page_size, 3);
        assert_eq!(config.listing_revalidate, Duration::from_secs(180));
        assert_eq!(config.quote_modules, vec!["summaryProfile".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MarketConfig::builder()
            .api_base("http://localhost:8080")
            .api_token("secret")
            .max_retries(1)
            .listing_page_size(15)
            .request_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.listing_page_size, 15);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let config = MarketConfig::builder().max_retries(0).build().unwrap();
        assert_eq!(config.max_attempts(), 1);
    }

    #[test]
    fn test_validation_caps_attempts_at_three() {
        assert!(MarketConfig::builder().max_retries(2).build().is_ok());

        let result = MarketConfig::builder().max_retries(3).build();
        assert!(matches!(result, Err(MarketError::ConfigError(_))));

        let config = MarketConfig {
            max_retries: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_settings() {
        let config = MarketConfig::builder()
            .temperature(0.4)
            .max_output_tokens(2048)
            .build()
            .unwrap();
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.max_output_tokens, Some(2048));

        assert!(MarketConfig::builder().temperature(3.5).build().is_err());
        assert!(MarketConfig::builder().max_output_tokens(0).build().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_page() {
        let result = MarketConfig::builder().listing_page(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_rate_limit() {
        let result = MarketConfig::builder().rate_limit_per_minute(0).build();
        assert!(result.is_err());
    }
}
