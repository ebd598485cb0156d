//! Command-line buy/sell dashboard for the B3 market

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use radar_llm::providers::GeminiProvider;
use radar_market::{
    BrapiClient, Dashboard, DashboardMode, MarketConfig, MarketDataSource, NarrativeGenerator,
    QuoteAggregator, parse_symbols,
};
use radar_utils::{Config, init_tracing_with};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "radar")]
#[command(version, about = "Buy/sell radar for B3 stocks", long_about = None)]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tradable symbols
    Symbols {
        /// Symbols per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<u32>,
    },

    /// Fetch quotes for one symbol or a comma-separated list
    Quotes {
        /// e.g. `PETR4` or `PETR4,VALE3,ITUB4`
        symbols: String,
    },

    /// Build the buy/sell dashboard from the listed symbols
    Dashboard {
        /// Ask the generative model for picks instead of ranking by change
        #[arg(long)]
        ai: bool,

        /// Re-run every N seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = Config::from_env()?;
    init_tracing_with(app_config.log_format);

    let cli = Cli::parse();
    info!("Starting {} ({})", app_config.app_name, app_config.environment);

    let config = Arc::new(MarketConfig::from_env().context("invalid market configuration")?);
    let client = Arc::new(BrapiClient::new(Arc::clone(&config))?);

    match cli.command {
        Commands::Symbols { limit, page } => {
            let limit = limit.unwrap_or(config.listing_page_size);
            let page = page.unwrap_or(config.listing_page);
            let symbols = client
                .list_symbols(limit, page)
                .await
                .context("failed to fetch tickers list")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&symbols)?);
            } else {
                output::print_symbols(&symbols);
            }
        }
        Commands::Quotes { symbols } => {
            let symbols = parse_symbols(&symbols);
            anyhow::ensure!(!symbols.is_empty(), "no symbols given");

            let quotes = QuoteAggregator::new(client)
                .aggregate(&symbols)
                .await
                .context("failed to fetch quote")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quotes)?);
            } else {
                output::print_quotes(&quotes);
            }
        }
        Commands::Dashboard { ai, watch } => {
            let mut dashboard = Dashboard::new(client, Arc::clone(&config));
            let mode = if ai {
                let provider = GeminiProvider::from_env()
                    .context("GEMINI_API_KEY is required for --ai")?;
                dashboard = dashboard
                    .with_narrative(NarrativeGenerator::from_config(Arc::new(provider), &config));
                DashboardMode::Narrative
            } else {
                DashboardMode::Ranking
            };

            match watch {
                Some(secs) => watch_dashboard(&dashboard, mode, secs, cli.json).await?,
                None => render_dashboard(&dashboard, mode, cli.json).await?,
            }
        }
    }

    Ok(())
}

async fn render_dashboard(
    dashboard: &Dashboard,
    mode: DashboardMode,
    json: bool,
) -> anyhow::Result<()> {
    let view = dashboard.render(mode).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        output::print_dashboard(&view);
    }
    Ok(())
}

/// Re-render on a fixed period; a failed refresh is logged and retried next tick
async fn watch_dashboard(
    dashboard: &Dashboard,
    mode: DashboardMode,
    secs: u64,
    json: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(secs > 0, "--watch needs a period of at least one second");
    let mut interval = tokio::time::interval(Duration::from_secs(secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = render_dashboard(dashboard, mode, json).await {
                    error!("Refresh failed: {e:#}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping refresh");
                return Ok(());
            }
        }
    }
}
