//! Odds types for 1X2 sporting events.

use rust_decimal::Decimal;
use strum::{Display, EnumString};
use time::OffsetDateTime;

/// Match outcome in a 1X2 market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Outcome {
    /// Home team wins.
    #[strum(to_string = "home", serialize = "HOME", serialize = "1")]
    Home,
    /// Match is drawn.
    #[strum(to_string = "draw", serialize = "DRAW", serialize = "X")]
    Draw,
    /// Away team wins.
    #[strum(to_string = "away", serialize = "AWAY", serialize = "2")]
    Away,
}

impl Outcome {
    /// Outcomes in evaluation order.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];
}

/// One bookmaker's or exchange's prices for one event.
#[derive(Debug, Clone)]
pub struct OddsQuote {
    /// Source identifier (e.g., "bet365", "betfair_ex_uk").
    pub source_key: String,
    /// Display name of the source.
    pub source_title: String,
    /// Decimal odds for the home win.
    pub home: Option<Decimal>,
    /// Decimal odds for the draw (absent in two-way markets).
    pub draw: Option<Decimal>,
    /// Decimal odds for the away win.
    pub away: Option<Decimal>,
    /// When the source last updated these prices.
    pub last_update: OffsetDateTime,
}

impl OddsQuote {
    /// Price for an outcome. Anything at or below 1.0 is not a valid
    /// decimal price and is reported as absent.
    pub fn price(&self, outcome: Outcome) -> Option<Decimal> {
        let price = match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }?;
        (price > Decimal::ONE).then_some(price)
    }

    /// Iterate over every valid price this quote carries.
    pub fn prices(&self) -> impl Iterator<Item = (Outcome, Decimal)> + '_ {
        Outcome::ALL
            .into_iter()
            .filter_map(|outcome| self.price(outcome).map(|p| (outcome, p)))
    }
}

/// One sporting event with every source's quotes.
#[derive(Debug, Clone)]
pub struct EventOdds {
    /// Unique event identifier from the feed.
    pub event_id: String,
    /// League key (e.g., "soccer_epl").
    pub league_key: String,
    /// League display name (e.g., "EPL").
    pub league: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Scheduled kickoff.
    pub kickoff: OffsetDateTime,
    /// Quotes from all sources.
    pub quotes: Vec<OddsQuote>,
}

impl EventOdds {
    /// "Home vs Away".
    pub fn display_name(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Display name of an outcome for this event.
    pub fn outcome_name(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Home => &self.home_team,
            Outcome::Draw => "Draw",
            Outcome::Away => &self.away_team,
        }
    }

    /// Quotes can only be acted on before kickoff.
    pub fn is_actionable(&self, as_of: OffsetDateTime) -> bool {
        self.kickoff > as_of && !self.quotes.is_empty()
    }

    /// Find a source's quote by key.
    pub fn quote(&self, source_key: &str) -> Option<&OddsQuote> {
        self.quotes.iter().find(|q| q.source_key == source_key)
    }
}
