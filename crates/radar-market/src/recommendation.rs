//! Buy/sell recommendations and the view items handed to presentation

use crate::quote::Quote;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "Buy", alias = "BUY", alias = "compra")]
    Buy,
    #[serde(alias = "Sell", alias = "SELL", alias = "venda")]
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        })
    }
}

/// Expected price trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[serde(alias = "Bullish", alias = "BULLISH")]
    Bullish,
    #[serde(alias = "Bearish", alias = "BEARISH")]
    Bearish,
    #[serde(alias = "Neutral", alias = "NEUTRAL")]
    Neutral,
}

impl Sentiment {
    /// Sentiment that agrees with a direction
    pub fn expected_for(direction: Direction) -> Self {
        match direction {
            Direction::Buy => Self::Bullish,
            Direction::Sell => Self::Bearish,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        })
    }
}

/// Price as a number or as the text the model wrote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Default for Price {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A quote annotated with an action, a sentiment and a short justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub date: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub change: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub status: Sentiment,
}

impl Recommendation {
    /// `buy` pairs with `bullish`, `sell` with `bearish`
    pub fn is_consistent(&self) -> bool {
        self.status == Sentiment::expected_for(self.direction)
    }
}

/// One card of the buy or sell list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardItem {
    pub ticker: String,
    /// `DD/MM`
    pub date: String,
    /// Signed percentage, e.g. `+3.50%`
    pub change: String,
    pub price: Price,
    pub description: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub status: Sentiment,
}

impl DashboardItem {
    /// Item for a quote picked by the ranking step
    pub fn from_ranked(quote: &Quote, direction: Direction) -> Self {
        let change = quote.ranked_change().unwrap_or_default();
        let description = if change > 0.0 {
            format!("{}: alta de {:.2}% no pregão", quote.long_name, change)
        } else if change < 0.0 {
            format!("{}: queda de {:.2}% no pregão", quote.long_name, change.abs())
        } else {
            format!("{}: estável no pregão", quote.long_name)
        };

        Self {
            ticker: quote.symbol.to_string(),
            date: quote.display_date().unwrap_or_else(|| "--/--".to_string()),
            change: quote.change_label().unwrap_or_default(),
            price: quote.price.map_or_else(Price::default, Price::Number),
            description,
            direction,
            status: Sentiment::expected_for(direction),
        }
    }
}

impl From<Recommendation> for DashboardItem {
    fn from(rec: Recommendation) -> Self {
        Self {
            ticker: rec.ticker,
            date: rec.date,
            change: rec.change,
            price: rec.price,
            description: rec.description,
            direction: rec.direction,
            status: rec.status,
        }
    }
}

/// Models sometimes answer numbers where text was asked for
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{QuoteRecord, Symbol};

    #[test]
    fn test_recommendation_decoding() {
        let raw = r#"{
            "ticker": "PETR4",
            "name": "Petrobras",
            "date": "16/10",
            "change": 2.1,
            "price": "37.12",
            "description": "Petróleo em alta",
            "type": "Buy",
            "status": "bullish"
        }"#;
        let rec: Recommendation = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.direction, Direction::Buy);
        assert_eq!(rec.change, "2.1");
        assert_eq!(rec.price, Price::Text("37.12".to_string()));
        assert!(rec.is_consistent());
    }

    #[test]
    fn test_recommendation_requires_type_and_status() {
        let raw = r#"{"ticker": "PETR4"}"#;
        assert!(serde_json::from_str::<Recommendation>(raw).is_err());

        let raw = r#"{"ticker": "PETR4", "type": "hold", "status": "neutral"}"#;
        assert!(serde_json::from_str::<Recommendation>(raw).is_err());
    }

    #[test]
    fn test_inconsistent_pairing_is_detected() {
        let raw = r#"{"ticker": "VALE3", "price": 61.5, "type": "sell", "status": "bullish"}"#;
        let rec: Recommendation = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.price, Price::Number(61.5));
        assert!(!rec.is_consistent());
    }

    #[test]
    fn test_item_from_ranked_quote() {
        let symbol = Symbol::new("AAA").unwrap();
        let mut quote = Quote::from_record(QuoteRecord::default(), &symbol);
        quote.change_percent = Some(-1.2);
        quote.price = Some(10.0);

        let item = DashboardItem::from_ranked(&quote, Direction::Sell);
        assert_eq!(item.ticker, "AAA");
        assert_eq!(item.date, "--/--");
        assert_eq!(item.change, "-1.20%");
        assert_eq!(item.price.to_string(), "10.00");
        assert_eq!(item.status, Sentiment::Bearish);
        assert!(item.description.contains("queda de 1.20%"));
    }

    #[test]
    fn test_item_serializes_with_wire_names() {
        let symbol = Symbol::new("AAA").unwrap();
        let quote = Quote::from_record(QuoteRecord::default(), &symbol);
        let json = serde_json::to_value(DashboardItem::from_ranked(&quote, Direction::Buy)).unwrap();

        assert_eq!(json["type"], "buy");
        assert_eq!(json["status"], "bullish");
        assert_eq!(json["price"], "");
    }
}
