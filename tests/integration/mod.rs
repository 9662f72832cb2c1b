//! End-to-end tests over the public engine API.
//!
//! Odds snapshot → pairings → ranked recommendations, and offer catalog →
//! profit estimates → catalog order.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::datetime;
use time::OffsetDateTime;

use matched_betting::calculator::{
    calculate, offer_instructions, round_money, BetSelection, BetType, StakeRequest,
};
use matched_betting::matching::{
    find_pairings, rank, ExchangeKeys, PairingFilter, RankRequest, RankingPolicy,
};
use matched_betting::odds::{filter_by_league, filter_by_odds_range, EventOdds, OddsQuote, Outcome};
use matched_betting::offers::{
    resolve_expected_profit, sort_offers, terms_fingerprint, Difficulty, MainstreamBookmakers,
    OfferProfitEstimator, OfferRecord,
};
use matched_betting::Config;

const UPDATED: OffsetDateTime = datetime!(2026-10-19 09:00 UTC);

fn quote(key: &str, title: &str, home: Decimal, draw: Decimal, away: Decimal) -> OddsQuote {
    OddsQuote {
        source_key: key.to_string(),
        source_title: title.to_string(),
        home: Some(home),
        draw: Some(draw),
        away: Some(away),
        last_update: UPDATED,
    }
}

fn event(id: &str, league_key: &str, league: &str, kickoff: OffsetDateTime, quotes: Vec<OddsQuote>) -> EventOdds {
    EventOdds {
        event_id: id.to_string(),
        league_key: league_key.to_string(),
        league: league.to_string(),
        home_team: format!("{id} Home"),
        away_team: format!("{id} Away"),
        kickoff,
        quotes,
    }
}

fn snapshot() -> Vec<EventOdds> {
    vec![
        event(
            "epl",
            "soccer_epl",
            "EPL",
            datetime!(2026-10-20 15:00 UTC),
            vec![
                quote("bet365", "Bet365", dec!(2.10), dec!(3.40), dec!(3.60)),
                quote("williamhill", "William Hill", dec!(2.05), dec!(3.45), dec!(3.50)),
                quote("smarkets", "Smarkets", dec!(2.30), dec!(3.60), dec!(3.80)),
                quote("betfair_ex_uk", "Betfair", dec!(2.12), dec!(3.50), dec!(3.70)),
            ],
        ),
        event(
            "laliga",
            "soccer_spain_la_liga",
            "La Liga",
            datetime!(2026-10-20 20:00 UTC),
            vec![
                quote("coral", "Coral", dec!(1.80), dec!(3.60), dec!(4.60)),
                quote("betfair_ex_uk", "Betfair", dec!(1.82), dec!(3.90), dec!(4.70)),
            ],
        ),
        event(
            "mls",
            "soccer_usa_mls",
            "MLS",
            datetime!(2026-10-19 23:00 UTC),
            vec![
                quote("unibet", "Unibet", dec!(2.50), dec!(3.30), dec!(2.70)),
                quote("betfair_ex_uk", "Betfair", dec!(2.52), dec!(3.35), dec!(2.74)),
            ],
        ),
    ]
}

#[test]
fn snapshot_to_recommendations() {
    let config = Config::default();
    let events = filter_by_league(
        &snapshot(),
        &["soccer_epl".to_string(), "soccer_spain_la_liga".to_string()],
    );
    let events = filter_by_odds_range(&events, config.min_odds, config.max_odds);
    assert_eq!(events.len(), 2);

    let filter = PairingFilter {
        max_spread: dec!(2.5),
        ..config.pairing_filter()
    };
    let pairings = find_pairings(&events, &filter, &config.exchange_keys());

    // Smarkets is an exchange and never a back source.
    assert!(pairings.iter().all(|p| p.back_bookmaker != "Smarkets"));
    assert!(pairings.iter().all(|p| p.spread_percent <= dec!(2.5)));
    assert!(pairings.windows(2).all(|w| w[0].spread_percent <= w[1].spread_percent));

    let recommendations = rank(&pairings, &config.rank_request(), &RankingPolicy::default()).unwrap();

    assert!(recommendations.len() <= config.recommendation_limit);
    assert!(recommendations.windows(2).all(|w| w[0].score >= w[1].score));

    let top = &recommendations[0];
    assert_eq!(top.pairing.event_id, "epl");
    assert_eq!(top.pairing.outcome, Outcome::Home);
    assert_eq!(top.pairing.back_bookmaker, "Bet365");
    assert!(top.qualifying_loss() > Decimal::ZERO);
    assert!(top.free_bet_profit() > Decimal::ZERO);
}

#[test]
fn wide_spreads_are_dropped() {
    let events = vec![
        event(
            "tight",
            "soccer_epl",
            "EPL",
            datetime!(2026-10-20 15:00 UTC),
            vec![
                OddsQuote { draw: None, away: None, ..quote("bet365", "Bet365", dec!(2.00), dec!(0), dec!(0)) },
                OddsQuote { draw: None, away: None, ..quote("betfair_ex_uk", "Betfair", dec!(2.01), dec!(0), dec!(0)) },
            ],
        ),
        event(
            "wide",
            "soccer_epl",
            "EPL",
            datetime!(2026-10-20 15:00 UTC),
            vec![
                OddsQuote { draw: None, away: None, ..quote("bet365", "Bet365", dec!(2.00), dec!(0), dec!(0)) },
                OddsQuote { draw: None, away: None, ..quote("betfair_ex_uk", "Betfair", dec!(2.09), dec!(0), dec!(0)) },
            ],
        ),
    ];
    let filter = PairingFilter {
        max_spread: dec!(2.0),
        ..PairingFilter::default()
    };

    let pairings = find_pairings(&events, &filter, &ExchangeKeys::default());

    assert_eq!(pairings.len(), 1);
    assert_eq!(pairings[0].event_id, "tight");
    assert_eq!(pairings[0].spread_percent, dec!(0.5));
}

#[test]
fn kicked_off_events_are_skipped() {
    let filter = PairingFilter {
        as_of: Some(datetime!(2026-10-20 00:00 UTC)),
        ..PairingFilter::default()
    };

    let pairings = find_pairings(&snapshot(), &filter, &ExchangeKeys::default());

    assert!(!pairings.is_empty());
    assert!(pairings.iter().all(|p| p.event_id != "mls"));
}

#[test]
fn ranking_an_empty_list_is_an_error() {
    let request = RankRequest {
        limit: 5,
        ..Config::default().rank_request()
    };

    assert!(rank(&[], &request, &RankingPolicy::default()).is_err());
}

#[test]
fn free_bet_beats_qualifying_on_same_market() {
    let qualifying = calculate(&StakeRequest::new(dec!(3.0), dec!(3.05), dec!(20), BetType::Qualifying, dec!(0.05))).unwrap();
    let free_bet = calculate(&StakeRequest::new(dec!(3.0), dec!(3.05), dec!(20), BetType::FreeBetSnr, dec!(0.05))).unwrap();

    assert!(qualifying.guaranteed_profit < Decimal::ZERO);
    assert!(free_bet.guaranteed_profit > Decimal::ZERO);

    let retention = free_bet.retention_percent(dec!(20)).unwrap();
    assert!(retention > dec!(50) && retention < dec!(85));
}

#[test]
fn catalog_estimate_then_sort() {
    let estimator = Config::default().offer_estimator();
    assert_eq!(estimator, OfferProfitEstimator::default());

    let stored_terms = "Bet £10 get £30 in free bets. Min odds 2.0.";
    let offers = vec![
        OfferRecord {
            bookmaker: "Midnite".to_string(),
            offer_name: "Bet 10 Get 60".to_string(),
            offer_value: Some(dec!(60)),
            required_stake: Some(dec!(10)),
            ..OfferRecord::default()
        },
        OfferRecord {
            bookmaker: "Paddy Power Sportsbook".to_string(),
            offer_name: "Bet 5 Get 20".to_string(),
            offer_value: Some(dec!(20)),
            required_stake: Some(dec!(5)),
            min_odds: Some(dec!(1.5)),
            difficulty: Some(Difficulty::Easy),
            ..OfferRecord::default()
        },
        OfferRecord {
            bookmaker: "Sky Bet".to_string(),
            offer_name: "Bet 10 Get 30".to_string(),
            offer_value: Some(dec!(30)),
            required_stake: Some(dec!(10)),
            terms_summary: Some(stored_terms.to_string()),
            terms_hash: terms_fingerprint(Some(stored_terms)),
            expected_profit: Some(dec!(21.00)),
            ..OfferRecord::default()
        },
        OfferRecord {
            bookmaker: "Betfair".to_string(),
            offer_name: "Mystery offer".to_string(),
            ..OfferRecord::default()
        },
    ];

    let resolved: Vec<OfferRecord> = offers
        .into_iter()
        .map(|offer| OfferRecord {
            expected_profit: resolve_expected_profit(&offer, None, &estimator),
            ..offer
        })
        .collect();

    assert_eq!(resolved[2].expected_profit, Some(dec!(21.00)));
    assert_eq!(resolved[3].expected_profit, None);

    let sorted = sort_offers(&resolved, &MainstreamBookmakers::default());
    let order: Vec<&str> = sorted.iter().map(|o| o.offer_name.as_str()).collect();

    assert_eq!(
        order,
        vec!["Bet 10 Get 30", "Bet 5 Get 20", "Mystery offer", "Bet 10 Get 60"]
    );
}

#[test]
fn top_recommendation_to_offer_instructions() {
    let config = Config::default();
    let pairings = find_pairings(&snapshot(), &config.pairing_filter(), &config.exchange_keys());
    let request = RankRequest {
        free_bet_value: Some(dec!(30)),
        ..config.rank_request()
    };
    let top = rank(&pairings, &request, &RankingPolicy::default()).unwrap().remove(0);

    let (home_team, away_team) = (top.pairing.home_team.clone(), top.pairing.away_team.clone());
    let selection = BetSelection {
        home_team,
        away_team,
        outcome: top.pairing.outcome,
        bookmaker: top.pairing.back_bookmaker.clone(),
        exchange: top.pairing.lay_exchange.clone(),
        back_odds: top.pairing.back_odds,
        lay_odds: top.pairing.lay_odds,
        commission: request.commission,
        offer_name: Some("Bet 10 Get 30".to_string()),
        min_odds_required: Some(config.min_odds),
    };

    let instructions = offer_instructions(&selection, request.stake, dec!(30)).unwrap();

    assert_eq!(instructions.qualifying.lay_stake, round_money(top.lay_stake()));
    assert_eq!(instructions.total_qualifying_loss, -round_money(top.qualifying_loss()));
    assert!(instructions.total_profit > Decimal::ZERO);
    assert!(instructions.qualifying.warnings.is_empty());
    assert!(instructions.to_string().contains(&selection.bookmaker));
}
