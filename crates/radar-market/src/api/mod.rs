//! API clients for market data providers

pub mod brapi;
pub mod retry;

pub use brapi::BrapiClient;
pub use retry::RetryPolicy;

use crate::error::Result;
use crate::quote::{Quote, Symbol};
use async_trait::async_trait;

/// Source of symbol listings and single-symbol quotes
///
/// Implementations must issue one request per [`quote`](Self::quote) call;
/// batching is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// One page of tradable symbols
    async fn list_symbols(&self, limit: u32, page: u32) -> Result<Vec<Symbol>>;

    /// All records the provider returns for one symbol
    async fn quote(&self, symbol: &Symbol) -> Result<Vec<Quote>>;
}
