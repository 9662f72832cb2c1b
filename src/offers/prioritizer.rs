//! Catalog ordering.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use tracing::debug;

use super::types::{Difficulty, OfferRecord};

/// Brands surfaced first in the catalog regardless of profit.
pub const DEFAULT_MAINSTREAM_BOOKMAKERS: &[&str] = &[
    "bet365",
    "betfair",
    "sky bet",
    "paddy power",
    "william hill",
    "betway",
    "coral",
    "ladbrokes",
    "betvictor",
    "unibet",
];

/// Priority used for offers without a manual rank.
pub const UNRANKED_PRIORITY: u32 = 999;

const STRIPPED_SUFFIXES: &[&str] = &[" sportsbook", " exchange", " uk"];

const ALIASES: &[(&str, &str)] = &[("betwright", "betway"), ("bet wright", "betway")];

/// Allow-list of recognisable bookmaker brands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainstreamBookmakers {
    names: Vec<String>,
}

impl Default for MainstreamBookmakers {
    fn default() -> Self {
        Self::new(DEFAULT_MAINSTREAM_BOOKMAKERS.iter().copied())
    }
}

impl MainstreamBookmakers {
    /// Build an allow-list. Names are normalized on the way in.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| normalize(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// Exact or substring match (either direction) after normalization.
    pub fn is_mainstream(&self, bookmaker: &str) -> bool {
        let name = normalize(bookmaker);
        if name.is_empty() {
            return false;
        }
        self.names
            .iter()
            .any(|m| *m == name || name.contains(m.as_str()) || m.contains(name.as_str()))
    }
}

fn normalize(name: &str) -> String {
    let mut n = name.trim().to_lowercase();
    while n.contains("  ") {
        n = n.replace("  ", " ");
    }
    for suffix in STRIPPED_SUFFIXES {
        if let Some(stripped) = n.strip_suffix(suffix) {
            n = stripped.trim_end().to_string();
        }
    }
    for (alias, canonical) in ALIASES {
        if n == *alias {
            return (*canonical).to_string();
        }
    }
    n
}

/// Stable sort: mainstream brands first, then expected profit descending,
/// then easier offers, then manual priority.
pub fn sort_offers(offers: &[OfferRecord], mainstream: &MainstreamBookmakers) -> Vec<OfferRecord> {
    let mut sorted = offers.to_vec();
    sorted.sort_by_cached_key(|o| {
        (
            !mainstream.is_mainstream(&o.bookmaker),
            Reverse(o.expected_profit.unwrap_or(Decimal::ZERO)),
            Difficulty::rank(o.difficulty),
            o.priority_rank.unwrap_or(UNRANKED_PRIORITY),
        )
    });
    debug!(count = sorted.len(), "Sorted offer catalog");
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(bookmaker: &str, profit: Option<Decimal>) -> OfferRecord {
        OfferRecord {
            bookmaker: bookmaker.to_string(),
            offer_name: format!("{bookmaker} welcome"),
            expected_profit: profit,
            ..OfferRecord::default()
        }
    }

    fn names(offers: &[OfferRecord]) -> Vec<&str> {
        offers.iter().map(|o| o.offer_name.as_str()).collect()
    }

    #[test]
    fn mainstream_matching_tolerates_suffixes_and_case() {
        let list = MainstreamBookmakers::default();

        assert!(list.is_mainstream("Bet365"));
        assert!(list.is_mainstream("  BETFAIR Exchange "));
        assert!(list.is_mainstream("Sky Bet Sportsbook"));
        assert!(list.is_mainstream("William  Hill"));
        assert!(list.is_mainstream("Paddy Power UK"));
        assert!(list.is_mainstream("BetWright"));
        assert!(!list.is_mainstream("Midnite"));
        assert!(!list.is_mainstream(""));
        assert!(!list.is_mainstream("   "));
    }

    #[test]
    fn custom_list_overrides_default() {
        let list = MainstreamBookmakers::new(["Midnite", ""]);

        assert_eq!(list, MainstreamBookmakers::new(["  MIDNITE "]));
        assert!(list.is_mainstream("midnite"));
        assert!(!list.is_mainstream("bet365"));
    }

    #[test]
    fn mainstream_beats_profit() {
        let offers = vec![
            offer("Midnite", Some(dec!(40))),
            offer("Coral", Some(dec!(5))),
            offer("Bet365", Some(dec!(20))),
        ];

        let sorted = sort_offers(&offers, &MainstreamBookmakers::default());

        assert_eq!(names(&sorted), vec!["Bet365 welcome", "Coral welcome", "Midnite welcome"]);
    }

    #[test]
    fn difficulty_and_priority_break_ties() {
        let offers = vec![
            OfferRecord {
                difficulty: Some(Difficulty::Hard),
                ..offer("Coral", Some(dec!(10)))
            },
            OfferRecord {
                offer_name: "unknown".to_string(),
                ..offer("Ladbrokes", Some(dec!(10)))
            },
            OfferRecord {
                offer_name: "ranked".to_string(),
                difficulty: Some(Difficulty::Medium),
                priority_rank: Some(3),
                ..offer("Betway", Some(dec!(10)))
            },
            OfferRecord {
                difficulty: Some(Difficulty::Easy),
                ..offer("Unibet", Some(dec!(10)))
            },
        ];

        let sorted = sort_offers(&offers, &MainstreamBookmakers::default());

        assert_eq!(
            names(&sorted),
            vec!["Unibet welcome", "ranked", "unknown", "Coral welcome"]
        );
    }

    #[test]
    fn missing_profit_sorts_as_zero() {
        let offers = vec![
            offer("Bet365", None),
            offer("Betfair", Some(dec!(-2))),
            offer("Coral", Some(dec!(1))),
        ];

        let sorted = sort_offers(&offers, &MainstreamBookmakers::default());

        assert_eq!(names(&sorted), vec!["Coral welcome", "Bet365 welcome", "Betfair welcome"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let offers = vec![
            OfferRecord {
                offer_name: "first".to_string(),
                ..offer("Midnite", Some(dec!(10)))
            },
            OfferRecord {
                offer_name: "second".to_string(),
                ..offer("Kwiff", Some(dec!(10)))
            },
            OfferRecord {
                offer_name: "third".to_string(),
                ..offer("Fitzdares", Some(dec!(10)))
            },
        ];

        let sorted = sort_offers(&offers, &MainstreamBookmakers::default());

        assert_eq!(names(&sorted), vec!["first", "second", "third"]);
    }
}
