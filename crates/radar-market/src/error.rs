//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// The symbol listing endpoint answered with a non-success status
    #[error("Failed to fetch tickers list: HTTP {status}")]
    ListingFailed { status: u16 },

    /// A single-symbol quote request answered with a non-success status
    #[error("Quote request for {symbol} failed: HTTP {status}")]
    QuoteFailed { symbol: String, status: u16 },

    /// Invalid ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Every per-symbol quote request failed
    #[error("No quotes available for {requested} requested symbols")]
    NoQuotesAvailable { requested: usize },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Prompt template error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl MarketError {
    /// Whether another attempt of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::QuoteFailed { status, .. } => *status >= 500,
            Self::RateLimitExceeded { .. } => true,
            Self::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;
