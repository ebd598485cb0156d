//! Ranking dashboard example
//!
//! Lists symbols from brapi.dev, fetches their quotes and prints the top
//! gainers and losers.
//!
//! To run this example:
//! ```bash
//! # Optional: the free tier works without a token for a few tickers
//! export BRAPI_API_KEY=your_token_here
//!
//! # Comma-separated symbols, or none to use the listing endpoint
//! cargo run --example ranking_dashboard PETR4,VALE3,ITUB4,BBDC4
//! ```

use radar_market::{
    BrapiClient, Dashboard, DashboardMode, MarketConfig, QuoteAggregator, rank,
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    radar_utils::init_tracing();

    let config = Arc::new(MarketConfig::from_env()?);
    let client = Arc::new(BrapiClient::new(Arc::clone(&config))?);

    println!("=== B3 Radar ===\n");
    println!("Provider: {}", config.api_base);
    println!("Attempts per quote: {}\n", config.max_attempts());

    if let Some(symbols) = env::args().nth(1) {
        let quotes = QuoteAggregator::new(client).aggregate_str(&symbols).await?;
        let ranking = rank(quotes.as_slice());

        println!("Maiores altas:");
        for quote in &ranking.gainers {
            println!("  {} {}", quote.symbol, quote.change_label().unwrap_or_default());
        }
        println!("\nMaiores baixas:");
        for quote in &ranking.losers {
            println!("  {} {}", quote.symbol, quote.change_label().unwrap_or_default());
        }
        return Ok(());
    }

    let view = Dashboard::new(client, config).render(DashboardMode::Ranking).await?;
    println!("Status: {:?}", view.status);
    for item in view.buy.iter().chain(&view.sell) {
        println!("  [{}] {} {} - {}", item.direction, item.ticker, item.change, item.description);
    }

    Ok(())
}
