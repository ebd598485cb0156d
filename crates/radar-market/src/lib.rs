//! B3 buy/sell radar
//!
//! This crate turns provider quotes into a buy/sell dashboard. It includes:
//!
//! - Symbol listing and per-symbol quotes from brapi.dev
//! - Concurrent quote aggregation that tolerates partial failure
//! - Top gainers / top losers ranking
//! - Buy/sell recommendations written by a generative model (Gemini)
//!
//! # Architecture
//!
//! Data flows one way: `MarketDataSource::list_symbols` -> `QuoteAggregator`
//! -> `rank` or `NarrativeGenerator` -> `DashboardView`. Clients are built
//! once by the caller and injected, so every stage can be driven by mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use radar_llm::providers::GeminiProvider;
//! use radar_market::{BrapiClient, Dashboard, DashboardMode, MarketConfig, NarrativeGenerator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(MarketConfig::from_env()?);
//!     let source = Arc::new(BrapiClient::new(Arc::clone(&config))?);
//!     let narrative = NarrativeGenerator::new(
//!         Arc::new(GeminiProvider::from_env()?),
//!         config.model.clone(),
//!     );
//!
//!     let view = Dashboard::new(source, config)
//!         .with_narrative(narrative)
//!         .render(DashboardMode::Narrative)
//!         .await?;
//!
//!     for item in &view.buy {
//!         println!("{} {} {}", item.ticker, item.change, item.description);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod narrative;
pub mod prompts;
pub mod quote;
pub mod ranking;
pub mod recommendation;

// Re-export main types for convenience
pub use aggregator::QuoteAggregator;
pub use api::{BrapiClient, MarketDataSource, RetryPolicy};
pub use config::MarketConfig;
pub use dashboard::{Dashboard, DashboardMode, DashboardView, ViewStatus};
pub use error::{MarketError, Result};
pub use narrative::{NarrativeGenerator, ParseOutcome, parse_recommendations, strip_code_fence};
pub use quote::{Quote, QuoteMap, QuoteSet, Symbol, parse_symbols};
pub use ranking::{Ranking, TOP_K, rank};
pub use recommendation::{DashboardItem, Direction, Recommendation, Sentiment};
