//! Top gainers / top losers selection

use crate::quote::Quote;
use serde::Serialize;

/// Entries kept on each side of the ranking
pub const TOP_K: usize = 3;

/// Top-K gainers and losers of a quote set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Highest change first
    pub gainers: Vec<Quote>,
    /// Lowest change first
    pub losers: Vec<Quote>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty()
    }
}

/// Rank quotes by percentage change
///
/// Only rising quotes are gainers and only falling quotes are losers, so the
/// two sides never share a ticker. Quotes without a finite change, or with no
/// change at all, are not eligible. Sorting is stable, so ties keep their
/// input order.
pub fn rank(quotes: &[Quote]) -> Ranking {
    rank_top(quotes, TOP_K)
}

/// [`rank`] with a custom list size
pub fn rank_top(quotes: &[Quote], k: usize) -> Ranking {
    let eligible: Vec<(&Quote, f64)> = quotes
        .iter()
        .filter_map(|q| q.ranked_change().map(|c| (q, c)))
        .collect();

    let mut gainers: Vec<_> = eligible.iter().copied().filter(|(_, c)| *c > 0.0).collect();
    gainers.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    let mut losers: Vec<_> = eligible.into_iter().filter(|(_, c)| *c < 0.0).collect();
    losers.sort_by(|(_, a), (_, b)| a.total_cmp(b));

    Ranking {
        gainers: gainers.into_iter().take(k).map(|(q, _)| q.clone()).collect(),
        losers: losers.into_iter().take(k).map(|(q, _)| q.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{QuoteRecord, Symbol};

    fn quote(symbol: &str, change: Option<f64>) -> Quote {
        let symbol = Symbol::new(symbol).unwrap();
        let mut quote = Quote::from_record(QuoteRecord::default(), &symbol);
        quote.change_percent = change;
        quote
    }

    fn symbols(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.symbol.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_both_sides() {
        let quotes = vec![
            quote("AAA", Some(3.5)),
            quote("BBB", Some(-1.2)),
            quote("CCC", Some(0.4)),
            quote("DDD", Some(-4.0)),
            quote("EEE", Some(7.1)),
        ];

        let ranking = rank(&quotes);
        assert_eq!(symbols(&ranking.gainers), vec!["EEE", "AAA", "CCC"]);
        assert_eq!(symbols(&ranking.losers), vec!["DDD", "BBB"]);
    }

    #[test]
    fn test_rank_excludes_missing_and_non_finite_changes() {
        let quotes = vec![
            quote("AAA", None),
            quote("BBB", Some(f64::NAN)),
            quote("CCC", Some(f64::INFINITY)),
            quote("DDD", Some(0.0)),
            quote("EEE", Some(0.1)),
        ];

        let ranking = rank(&quotes);
        assert_eq!(symbols(&ranking.gainers), vec!["EEE"]);
        assert!(ranking.losers.is_empty());
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let quotes = vec![
            quote("AAA", Some(1.0)),
            quote("BBB", Some(1.0)),
            quote("CCC", Some(1.0)),
            quote("DDD", Some(1.0)),
        ];

        let ranking = rank(&quotes);
        assert_eq!(symbols(&ranking.gainers), vec!["AAA", "BBB", "CCC"]);
        assert!(ranking.losers.is_empty());
    }

    #[test]
    fn test_few_quotes_never_land_on_both_sides() {
        let quotes = vec![quote("AAA", Some(3.5)), quote("BBB", Some(-1.2))];

        let ranking = rank(&quotes);
        assert_eq!(symbols(&ranking.gainers), vec!["AAA"]);
        assert_eq!(symbols(&ranking.losers), vec!["BBB"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let quotes = vec![
            quote("AAA", Some(2.0)),
            quote("BBB", Some(-3.0)),
            quote("CCC", Some(5.0)),
            quote("DDD", Some(-0.5)),
            quote("EEE", Some(2.0)),
            quote("FFF", None),
        ];

        let first = rank(&quotes);
        assert_eq!(rank(&first.gainers).gainers, first.gainers);
        assert_eq!(rank(&first.losers).losers, first.losers);
    }

    #[test]
    fn test_rank_empty_input() {
        assert!(rank(&[]).is_empty());
    }
}
