//! Quote aggregation across many symbols
//!
//! Issues one request per symbol, concurrently, and merges whatever succeeds
//! in request order. A single failing symbol never fails the batch; only a
//! batch with nothing to show does.

use crate::api::MarketDataSource;
use crate::error::{MarketError, Result};
use crate::quote::{Quote, QuoteMap, QuoteSet, Symbol, parse_symbols};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fans quote requests out over a [`MarketDataSource`]
#[derive(Clone)]
pub struct QuoteAggregator {
    source: Arc<dyn MarketDataSource>,
}

impl QuoteAggregator {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Successful responses in request order, one entry per requested symbol
    #[instrument(skip(self), fields(requested = symbols.len()))]
    async fn fetch_all(&self, symbols: &[Symbol]) -> Result<Vec<(Symbol, Vec<Quote>)>> {
        let requests = symbols.iter().map(|symbol| self.source.quote(symbol));
        let results = futures::future::join_all(requests).await;

        let mut fetched = Vec::with_capacity(symbols.len());
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(quotes) if quotes.is_empty() => {
                    debug!("No records returned for {symbol}, skipping");
                }
                Ok(quotes) => fetched.push((symbol.clone(), quotes)),
                Err(e) => debug!("Skipping {symbol}: {e}"),
            }
        }

        if fetched.is_empty() {
            return Err(MarketError::NoQuotesAvailable {
                requested: symbols.len(),
            });
        }

        info!(
            "Fetched quotes for {}/{} symbols",
            fetched.len(),
            symbols.len()
        );
        Ok(fetched)
    }

    /// Quotes grouped by requested symbol; failed symbols are absent
    pub async fn aggregate_by_symbol(&self, symbols: &[Symbol]) -> Result<QuoteMap> {
        let mut merged = QuoteMap::new();
        for (symbol, quotes) in self.fetch_all(symbols).await? {
            merged.insert(symbol, quotes);
        }
        Ok(merged)
    }

    /// Flattened quotes in request order
    pub async fn aggregate(&self, symbols: &[Symbol]) -> Result<QuoteSet> {
        let fetched = self.fetch_all(symbols).await?;
        Ok(fetched.into_iter().flat_map(|(_, quotes)| quotes).collect())
    }

    /// Like [`aggregate`](Self::aggregate) for a comma-delimited symbol list
    pub async fn aggregate_str(&self, symbols: &str) -> Result<QuoteSet> {
        self.aggregate(&parse_symbols(symbols)).await
    }
}
