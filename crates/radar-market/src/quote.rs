//! Quote data model
//!
//! Provider envelopes are decoded into the raw `*Record` types with a default
//! for every optional field, then converted once into [`Quote`].

use crate::error::MarketError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// B3 trades in Brasília time (UTC-3, no daylight saving since 2019)
const MARKET_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Epoch values above this are taken to be milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Ticker symbol, trimmed and never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, returning `None` for blank input
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| MarketError::InvalidSymbol(s.to_string()))
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a single symbol or a comma-delimited list into symbols
///
/// Entries are trimmed and blanks are dropped. Order and duplicates are kept.
pub fn parse_symbols(input: &str) -> Vec<Symbol> {
    input.split(',').filter_map(Symbol::new).collect()
}

/// Market timestamp as sent by the provider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarketTime {
    /// Seconds (or milliseconds) since the Unix epoch
    Epoch(i64),
    /// ISO-8601 date or date-time
    Iso(String),
}

impl MarketTime {
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(Self::Epoch),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(Self::Iso(s)),
            _ => None,
        }
    }

    /// Instant in market time, `None` if the value cannot be interpreted
    pub fn to_market_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(MARKET_UTC_OFFSET_SECS)?;
        match self {
            Self::Epoch(raw) => {
                let secs = if raw.unsigned_abs() > EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
                    raw / 1000
                } else {
                    *raw
                };
                DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&offset))
            }
            Self::Iso(raw) => {
                let raw = raw.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                    return Some(dt.with_timezone(&offset));
                }
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)?
                    .and_local_timezone(offset)
                    .single()
            }
        }
    }

    /// Day and month in market time, e.g. `17/10`
    pub fn display_date(&self) -> Option<String> {
        self.to_market_datetime()
            .map(|dt| dt.format("%d/%m").to_string())
    }
}

/// One market-data snapshot for a symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: Symbol,
    #[serde(rename = "longName")]
    pub long_name: String,
    #[serde(rename = "regularMarketPrice")]
    pub price: Option<f64>,
    #[serde(rename = "regularMarketChangePercent")]
    pub change_percent: Option<f64>,
    #[serde(rename = "regularMarketTime")]
    pub market_time: Option<MarketTime>,
}

impl Quote {
    /// Convert a provider record, using `requested` when the record lacks a symbol
    pub fn from_record(record: QuoteRecord, requested: &Symbol) -> Self {
        let symbol = record
            .symbol
            .as_deref()
            .and_then(Symbol::new)
            .unwrap_or_else(|| requested.clone());

        let long_name = record
            .long_name
            .filter(|n| !n.trim().is_empty())
            .or(record.short_name.filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| symbol.to_string());

        Self {
            symbol,
            long_name,
            price: record.regular_market_price,
            change_percent: record.regular_market_change_percent,
            market_time: record.regular_market_time,
        }
    }

    /// Change percentage if it is a usable number
    pub fn ranked_change(&self) -> Option<f64> {
        self.change_percent.filter(|c| c.is_finite())
    }

    /// Signed percentage, e.g. `+3.50%`
    pub fn change_label(&self) -> Option<String> {
        self.ranked_change().map(|c| format!("{c:+.2}%"))
    }

    /// Day and month of the quote, e.g. `17/10`
    pub fn display_date(&self) -> Option<String> {
        self.market_time.as_ref().and_then(MarketTime::display_date)
    }
}

/// Quotes in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteSet(Vec<Quote>);

impl QuoteSet {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self(quotes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Quote] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Quote> {
        self.0
    }
}

impl FromIterator<Quote> for QuoteSet {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for QuoteSet {
    type Item = Quote;
    type IntoIter = std::vec::IntoIter<Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuoteSet {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Symbol to records mapping, kept in request order
///
/// Serializes as a JSON object so it can be embedded in a prompt as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteMap {
    entries: Vec<(Symbol, Vec<Quote>)>,
}

impl QuoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records for a symbol, appending if the symbol is already present
    pub fn insert(&mut self, symbol: Symbol, quotes: Vec<Quote>) {
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, existing)) => existing.extend(quotes),
            None => self.entries.push((symbol, quotes)),
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&[Quote]> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, q)| q.as_slice())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|(s, _)| s)
    }

    /// Number of symbols with data
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total records across all symbols
    pub fn quote_count(&self) -> usize {
        self.entries.iter().map(|(_, q)| q.len()).sum()
    }

    /// Flatten into a [`QuoteSet`], symbol by symbol
    pub fn into_quote_set(self) -> QuoteSet {
        self.entries.into_iter().flat_map(|(_, q)| q).collect()
    }
}

impl Serialize for QuoteMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, quotes) in &self.entries {
            map.serialize_entry(symbol.as_str(), quotes)?;
        }
        map.end()
    }
}

/// `{ results: [...] }` envelope of the quote endpoint
#[derive(Debug, Default, Deserialize)]
pub struct QuoteEnvelope {
    #[serde(default)]
    pub results: Vec<QuoteRecord>,
    /// Set on error payloads
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw quote record as sent by the provider
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub regular_market_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub regular_market_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_market_time")]
    pub regular_market_time: Option<MarketTime>,
}

/// `{ stocks: [ { stock, ... } ] }` envelope of the listing endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListingEnvelope {
    #[serde(default)]
    pub stocks: Vec<ListingRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingRecord {
    #[serde(default)]
    pub stock: Option<String>,
}

impl ListingEnvelope {
    /// Symbols in listing order, dropping entries without one
    pub fn into_symbols(self) -> Vec<Symbol> {
        self.stocks
            .into_iter()
            .filter_map(|s| s.stock.as_deref().and_then(Symbol::new))
            .collect()
    }
}

/// Accept numbers, numeric strings and null; anything else becomes `None`
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite()))
}

fn lenient_market_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MarketTime>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(MarketTime::from_json))
}
