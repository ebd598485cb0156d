//! brapi.dev API client
//!
//! The free tier accepts a single ticker and a single module per quote
//! request, so quotes are always fetched one symbol at a time.

use crate::api::{MarketDataSource, RetryPolicy};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::quote::{ListingEnvelope, Quote, QuoteEnvelope, Symbol};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

const PROVIDER: &str = "brapi";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// brapi.dev API client
#[derive(Debug, Clone)]
pub struct BrapiClient {
    client: Client,
    config: Arc<MarketConfig>,
    retry: RetryPolicy,
    rate_limiter: Option<SharedRateLimiter>,
}

impl BrapiClient {
    /// Create a new client from configuration
    ///
    /// The per-request timeout and the retry budget come from `config`.
    pub fn new(config: Arc<MarketConfig>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let rate_limiter = config
            .rate_limit_per_minute
            .and_then(NonZeroU32::new)
            .map(|limit| Arc::new(RateLimiter::direct(Quota::per_minute(limit))));

        Ok(Self {
            retry: RetryPolicy::from_config(&config),
            client,
            config,
            rate_limiter,
        })
    }

    /// Create from environment variables with default settings
    pub fn from_env() -> Result<Self> {
        Self::new(Arc::new(MarketConfig::from_env()?))
    }

    /// Get the current configuration
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.config.api_base.trim_end_matches('/'))
    }

    /// Quote endpoint for one symbol, escaped as a single path segment
    fn quote_url(&self, symbol: &Symbol) -> Result<Url> {
        let base = self.url("quote/");
        let mut url = Url::parse(&base)
            .map_err(|e| MarketError::ConfigError(format!("invalid api_base {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| MarketError::ConfigError(format!("api_base {base} cannot hold a path")))?
            .pop_if_empty()
            .push(symbol.as_str());
        Ok(url)
    }

    /// Attach the bearer header when a token is configured
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn listing_params(&self, limit: u32, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", limit.to_string()), ("page", page.to_string())];
        if let Some(token) = &self.config.api_token {
            params.push(("token", token.clone()));
        }
        params
    }

    fn quote_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.config.quote_modules.is_empty() {
            params.push(("modules", self.config.quote_modules.join(",")));
        }
        if let Some(token) = &self.config.api_token {
            params.push(("token", token.clone()));
        }
        params
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    /// Single attempt of a quote request
    async fn fetch_quote_once(&self, symbol: &Symbol) -> Result<Vec<Quote>> {
        self.wait_for_rate_limit().await;

        let request = self.client.get(self.quote_url(symbol)?);
        let response = self
            .authorized(request)
            .query(&self.quote_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(quote_error(symbol, status, &body));
        }

        let envelope: QuoteEnvelope = response.json().await?;
        if envelope.error {
            return Err(MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: envelope
                    .message
                    .unwrap_or_else(|| "provider reported an error".to_string()),
            });
        }

        Ok(envelope
            .results
            .into_iter()
            .map(|record| Quote::from_record(record, symbol))
            .collect())
    }
}

#[async_trait]
impl MarketDataSource for BrapiClient {
    #[instrument(skip(self))]
    async fn list_symbols(&self, limit: u32, page: u32) -> Result<Vec<Symbol>> {
        self.wait_for_rate_limit().await;

        debug!(
            "Listing symbols (revalidate hint {}s)",
            self.config.listing_revalidate.as_secs()
        );

        let request = self.client.get(self.url("quote/list"));
        let response = self
            .authorized(request)
            .query(&self.listing_params(limit, page))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::ListingFailed {
                status: response.status().as_u16(),
            });
        }

        let envelope: ListingEnvelope = response.json().await?;
        let symbols = envelope.into_symbols();
        debug!("Listed {} symbols", symbols.len());
        Ok(symbols)
    }

    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn quote(&self, symbol: &Symbol) -> Result<Vec<Quote>> {
        self.retry
            .execute(&format!("quote {symbol}"), || self.fetch_quote_once(symbol))
            .await
    }
}

/// Classify a failed quote response
fn quote_error(symbol: &Symbol, status: StatusCode, body: &str) -> MarketError {
    match status {
        StatusCode::NOT_FOUND => MarketError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: if body.is_empty() {
                "not found".to_string()
            } else {
                body.chars().take(200).collect()
            },
        },
        StatusCode::TOO_MANY_REQUESTS => MarketError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        },
        _ => MarketError::QuoteFailed {
            symbol: symbol.to_string(),
            status: status.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> BrapiClient {
        let mut builder = MarketConfig::builder().api_base("https://brapi.test/");
        if let Some(token) = token {
            builder = builder.api_token(token);
        }
        BrapiClient::new(Arc::new(builder.build().unwrap())).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client(Some("test_key"));
        assert_eq!(client.config().api_token.as_deref(), Some("test_key"));
        assert_eq!(client.retry.max_attempts, 3);
        assert!(client.rate_limiter.is_none());
    }

    #[test]
    fn test_client_with_rate_limit() {
        let config = MarketConfig::builder()
            .rate_limit_per_minute(30)
            .build()
            .unwrap();
        let client = BrapiClient::new(Arc::new(config)).unwrap();
        assert!(client.rate_limiter.is_some());
    }

    #[test]
    fn test_urls() {
        let client = client(None);
        assert_eq!(client.url("quote/list"), "https://brapi.test/api/quote/list");
        assert_eq!(
            client.quote_url(&Symbol::new("PETR4").unwrap()).unwrap().as_str(),
            "https://brapi.test/api/quote/PETR4"
        );
    }

    #[test]
    fn test_symbol_is_escaped_as_one_path_segment() {
        let client = client(None);
        let url = client.quote_url(&Symbol::new("A/B?C#D").unwrap()).unwrap();

        assert_eq!(url.path(), "/api/quote/A%2FB%3FC%23D");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_bearer_header_only_sent_when_configured() {
        let anonymous = client(None);
        let request = anonymous
            .authorized(anonymous.client.get("https://brapi.test/api/quote/list"))
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());

        let authed = client(Some("abc"));
        let request = authed
            .authorized(authed.client.get("https://brapi.test/api/quote/list"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer abc"
        );
    }

    #[test]
    fn test_token_only_sent_when_configured() {
        let anonymous = client(None);
        assert_eq!(
            anonymous.listing_params(3, 1),
            vec![("limit", "3".to_string()), ("page", "1".to_string())]
        );
        assert_eq!(
            anonymous.quote_params(),
            vec![("modules", "summaryProfile".to_string())]
        );

        let authed = client(Some("abc"));
        assert!(authed.listing_params(3, 1).contains(&("token", "abc".to_string())));
        assert!(authed.quote_params().contains(&("token", "abc".to_string())));
    }

    #[test]
    fn test_quote_error_classification() {
        let symbol = Symbol::new("XXXX3").unwrap();

        let err = quote_error(&symbol, StatusCode::NOT_FOUND, "");
        assert!(matches!(err, MarketError::DataUnavailable { ref reason, .. } if reason == "not found"));
        assert!(!err.is_retryable());

        let err = quote_error(&symbol, StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, MarketError::RateLimitExceeded { .. }));

        let err = quote_error(&symbol, StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, MarketError::QuoteFailed { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_list_symbols() {
        let client = BrapiClient::from_env().unwrap();
        let symbols = client.list_symbols(3, 1).await.unwrap();
        assert!(!symbols.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_quote() {
        let client = BrapiClient::from_env().unwrap();
        let quotes = client.quote(&Symbol::new("PETR4").unwrap()).await.unwrap();
        assert_eq!(quotes[0].symbol.as_str(), "PETR4");
    }
}
