//! Dashboard pipeline
//!
//! Lister -> aggregator -> (ranking | narrative) -> buy/sell view. Every call
//! to [`Dashboard::render`] builds fresh request-scoped values; nothing is
//! kept between renders.

use crate::aggregator::QuoteAggregator;
use crate::api::MarketDataSource;
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::narrative::NarrativeGenerator;
use crate::ranking::rank;
use crate::recommendation::{DashboardItem, Direction};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How the buy/sell lists are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardMode {
    /// Top gainers to buy, top losers to sell
    Ranking,
    /// Picks written by the generative model
    Narrative,
}

/// Why a view is (or is not) populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Ready,
    /// The listing returned no symbols
    NoSymbols,
    /// Every quote request failed
    NoQuotes,
    /// Quotes were fetched but nothing could be recommended
    NoRecommendations,
}

/// Buy and sell lists ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub mode: DashboardMode,
    pub status: ViewStatus,
    pub buy: Vec<DashboardItem>,
    pub sell: Vec<DashboardItem>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    /// A view with no items
    pub fn empty(mode: DashboardMode, status: ViewStatus) -> Self {
        Self {
            mode,
            status,
            buy: Vec::new(),
            sell: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    fn from_items(mode: DashboardMode, buy: Vec<DashboardItem>, sell: Vec<DashboardItem>) -> Self {
        let status = if buy.is_empty() && sell.is_empty() {
            ViewStatus::NoRecommendations
        } else {
            ViewStatus::Ready
        };

        Self {
            mode,
            status,
            buy,
            sell,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty()
    }
}

/// Runs the whole pipeline against injected clients
#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn MarketDataSource>,
    aggregator: QuoteAggregator,
    narrative: Option<NarrativeGenerator>,
    config: Arc<MarketConfig>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<MarketConfig>) -> Self {
        Self {
            aggregator: QuoteAggregator::new(Arc::clone(&source)),
            source,
            narrative: None,
            config,
        }
    }

    /// Enable [`DashboardMode::Narrative`]
    pub fn with_narrative(mut self, narrative: NarrativeGenerator) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// List symbols, fetch their quotes and build the buy/sell view
    ///
    /// A failed listing is returned as an error. Missing quotes and unusable
    /// model output produce an empty view with the matching [`ViewStatus`].
    #[instrument(skip(self))]
    pub async fn render(&self, mode: DashboardMode) -> Result<DashboardView> {
        if mode == DashboardMode::Narrative && self.narrative.is_none() {
            return Err(MarketError::ConfigError(
                "narrative mode needs a generative model provider".to_string(),
            ));
        }

        let symbols = self
            .source
            .list_symbols(self.config.listing_page_size, self.config.listing_page)
            .await?;

        if symbols.is_empty() {
            info!("Listing returned no symbols");
            return Ok(DashboardView::empty(mode, ViewStatus::NoSymbols));
        }

        let quotes = match self.aggregator.aggregate_by_symbol(&symbols).await {
            Ok(quotes) => quotes,
            Err(MarketError::NoQuotesAvailable { requested }) => {
                warn!("No quotes available for {requested} listed symbols");
                return Ok(DashboardView::empty(mode, ViewStatus::NoQuotes));
            }
            Err(e) => return Err(e),
        };

        let view = match (mode, &self.narrative) {
            (DashboardMode::Narrative, Some(narrative)) => {
                let recs = narrative.recommend(&quotes).await?.into_recommendations();
                let (buy, sell): (Vec<_>, Vec<_>) = recs
                    .into_iter()
                    .partition(|rec| rec.direction == Direction::Buy);

                DashboardView::from_items(
                    mode,
                    buy.into_iter().map(DashboardItem::from).collect(),
                    sell.into_iter().map(DashboardItem::from).collect(),
                )
            }
            _ => {
                let ranking = rank(quotes.into_quote_set().as_slice());
                DashboardView::from_items(
                    mode,
                    ranking
                        .gainers
                        .iter()
                        .map(|q| DashboardItem::from_ranked(q, Direction::Buy))
                        .collect(),
                    ranking
                        .losers
                        .iter()
                        .map(|q| DashboardItem::from_ranked(q, Direction::Sell))
                        .collect(),
                )
            }
        };

        info!(
            "Rendered {:?} view with {} buy and {} sell items",
            view.mode,
            view.buy.len(),
            view.sell.len()
        );
        Ok(view)
    }
}
