//! End-to-end runs of the dashboard pipeline against in-memory clients

use async_trait::async_trait;
use radar_llm::{CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage};
use radar_market::narrative::ERROR_PLACEHOLDER;
use radar_market::{
    Dashboard, DashboardMode, Direction, MarketConfig, MarketDataSource, MarketError,
    NarrativeGenerator, ParseOutcome, Quote, QuoteAggregator, Symbol, ViewStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Listing plus a fixed change per symbol; symbols without a change fail
struct FakeSource {
    listing: Vec<&'static str>,
    changes: HashMap<&'static str, f64>,
    quote_calls: AtomicUsize,
}

impl FakeSource {
    fn new(listing: Vec<&'static str>, changes: &[(&'static str, f64)]) -> Self {
        Self {
            listing,
            changes: changes.iter().copied().collect(),
            quote_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn list_symbols(&self, _limit: u32, _page: u32) -> radar_market::Result<Vec<Symbol>> {
        Ok(self.listing.iter().filter_map(Symbol::new).collect())
    }

    async fn quote(&self, symbol: &Symbol) -> radar_market::Result<Vec<Quote>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        match self.changes.get(symbol.as_str()) {
            Some(change) => Ok(vec![Quote {
                symbol: symbol.clone(),
                long_name: format!("{symbol} S.A."),
                price: Some(12.34),
                change_percent: Some(*change),
                market_time: None,
            }]),
            None => Err(MarketError::QuoteFailed {
                symbol: symbol.to_string(),
                status: 500,
            }),
        }
    }
}

/// Answers every completion with the same text
struct FakeModel {
    reply: &'static str,
}

#[async_trait]
impl LLMProvider for FakeModel {
    async fn complete(&self, _request: CompletionRequest) -> radar_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message::assistant(self.reply),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn dashboard(source: Arc<FakeSource>) -> Dashboard {
    Dashboard::new(source, Arc::new(MarketConfig::default()))
}

#[tokio::test]
async fn test_partial_failure_still_ranks_survivors() {
    let source = Arc::new(FakeSource::new(
        vec!["AAA", "BBB", "CCC"],
        &[("AAA", 3.5), ("BBB", -1.2)],
    ));

    let aggregator = QuoteAggregator::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);
    let quotes = aggregator.aggregate_str("AAA,BBB,CCC").await.unwrap();
    assert_eq!(quotes.len(), 2);

    let view = dashboard(Arc::clone(&source))
        .render(DashboardMode::Ranking)
        .await
        .unwrap();

    assert_eq!(view.status, ViewStatus::Ready);
    assert_eq!(view.buy[0].ticker, "AAA");
    assert_eq!(view.buy[0].change, "+3.50%");
    assert_eq!(view.sell[0].ticker, "BBB");
    assert_eq!(view.sell[0].change, "-1.20%");
    assert!(view.buy.iter().chain(&view.sell).all(|i| i.ticker != "CCC"));
    assert!(view.buy.iter().all(|i| i.ticker != "BBB"));
    assert!(view.sell.iter().all(|i| i.ticker != "AAA"));
    assert!(view.buy.iter().all(|i| i.change.starts_with('+')));
    assert!(view.sell.iter().all(|i| i.change.starts_with('-')));
}

#[tokio::test]
async fn test_empty_listing_skips_aggregation() {
    let source = Arc::new(FakeSource::new(Vec::new(), &[("AAA", 1.0)]));

    let view = dashboard(Arc::clone(&source))
        .render(DashboardMode::Ranking)
        .await
        .unwrap();

    assert_eq!(view.status, ViewStatus::NoSymbols);
    assert!(view.is_empty());
    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_model_error_placeholder_yields_no_recommendations() {
    let source = Arc::new(FakeSource::new(vec!["AAA"], &[("AAA", 2.0)]));
    let narrative = NarrativeGenerator::new(
        Arc::new(FakeModel {
            reply: ERROR_PLACEHOLDER,
        }),
        "gemini-2.5-flash",
    );

    let view = dashboard(source)
        .with_narrative(narrative)
        .render(DashboardMode::Narrative)
        .await
        .unwrap();

    assert_eq!(view.status, ViewStatus::NoRecommendations);
    assert!(view.is_empty());
}

#[tokio::test]
async fn test_narrative_view_splits_by_type() {
    let reply = r#"```json
[
  {"ticker": "AAA", "name": "AAA S.A.", "date": "16/10", "change": "+2.00%", "price": "12.34", "description": "Setor aquecido", "type": "buy", "status": "bullish"},
  {"ticker": "BBB", "name": "BBB S.A.", "date": "16/10", "change": "-1.00%", "price": 8.5, "description": "Juros altos", "type": "sell", "status": "bearish"}
]
```"#;
    let source = Arc::new(FakeSource::new(vec!["AAA", "BBB"], &[("AAA", 2.0), ("BBB", -1.0)]));
    let narrative = NarrativeGenerator::new(Arc::new(FakeModel { reply }), "gemini-2.5-flash");

    let view = dashboard(source)
        .with_narrative(narrative)
        .render(DashboardMode::Narrative)
        .await
        .unwrap();

    assert_eq!(view.status, ViewStatus::Ready);
    assert_eq!(view.buy.len(), 1);
    assert_eq!(view.buy[0].ticker, "AAA");
    assert_eq!(view.buy[0].direction, Direction::Buy);
    assert_eq!(view.sell.len(), 1);
    assert_eq!(view.sell[0].price.to_string(), "8.50");
}

#[tokio::test]
async fn test_every_quote_failing_renders_no_quotes() {
    let source = Arc::new(FakeSource::new(vec!["AAA", "BBB"], &[]));

    let aggregator = QuoteAggregator::new(Arc::clone(&source) as Arc<dyn MarketDataSource>);
    let err = aggregator.aggregate_str("AAA,BBB").await.unwrap_err();
    assert!(matches!(err, MarketError::NoQuotesAvailable { requested: 2 }));

    let view = dashboard(source).render(DashboardMode::Ranking).await.unwrap();
    assert_eq!(view.status, ViewStatus::NoQuotes);
}

#[tokio::test]
async fn test_malformed_reply_is_reported_not_raised() {
    let generator = NarrativeGenerator::new(
        Arc::new(FakeModel {
            reply: "Aqui estão as recomendações: compre AAA",
        }),
        "gemini-2.5-flash",
    );

    let outcome = generator
        .recommend(&radar_market::QuoteMap::new())
        .await
        .unwrap();
    assert!(matches!(outcome, ParseOutcome::Malformed { .. }));
}
