use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::OddsError;

/// A numeric field as quoted by a bookmaker. Bookmaker feeds are loose, so a
/// quote can be absent or carry something that is not a number at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Quote {
    #[default]
    Missing,
    Value(f64),
    Malformed(Value),
}

impl Quote {
    pub fn value(&self) -> Option<f64> {
        match self {
            Quote::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Quote {
    fn from(value: f64) -> Self {
        Quote::Value(value)
    }
}

impl From<Option<f64>> for Quote {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Quote::Missing, Quote::Value)
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if let Some(v) = raw.as_f64() {
            return Ok(Quote::Value(v));
        }
        Ok(match raw {
            Value::Null => Quote::Missing,
            other => Quote::Malformed(other),
        })
    }
}

impl Serialize for Quote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quote::Missing => serializer.serialize_none(),
            Quote::Value(v) => serializer.serialize_f64(*v),
            Quote::Malformed(raw) => raw.serialize(serializer),
        }
    }
}

/// Market kind, keyed the way The Odds API names them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketKey {
    Moneyline,
    Spread,
    Total,
    Other(String),
}

impl From<String> for MarketKey {
    fn from(key: String) -> Self {
        match key.as_str() {
            "h2h" => MarketKey::Moneyline,
            "spreads" => MarketKey::Spread,
            "totals" => MarketKey::Total,
            _ => MarketKey::Other(key),
        }
    }
}

impl From<MarketKey> for String {
    fn from(key: MarketKey) -> Self {
        match key {
            MarketKey::Moneyline => "h2h".to_string(),
            MarketKey::Spread => "spreads".to_string(),
            MarketKey::Total => "totals".to_string(),
            MarketKey::Other(name) => name,
        }
    }
}

/// A named outcome inside a bookmaker market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutcome {
    pub name: String,
    #[serde(default)]
    pub price: Quote,
    #[serde(default, skip_serializing_if = "is_missing")]
    pub point: Quote,
}

fn is_missing(quote: &Quote) -> bool {
    matches!(quote, Quote::Missing)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarket {
    pub key: MarketKey,
    #[serde(default)]
    pub outcomes: Vec<RawOutcome>,
}

/// One bookmaker's snapshot of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookmaker {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub markets: Vec<RawMarket>,
}

/// Canonical team-market odds for a single event (The Odds API event shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOddsDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_title: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub bookmakers: Vec<RawBookmaker>,
}

impl RawOddsDocument {
    /// Parse a canonical odds document, or a list holding one.
    pub fn from_value(value: Value) -> Result<Self, OddsError> {
        let document = match value {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| OddsError::format("odds list is empty"))?,
            other => other,
        };

        let object = document
            .as_object()
            .ok_or_else(|| OddsError::format("odds document is not an object"))?;
        if !object.contains_key("bookmakers") {
            return Err(OddsError::format("odds document has no bookmakers"));
        }

        serde_json::from_value(document).map_err(|e| OddsError::format(e.to_string()))
    }
}

/// Moneyline prices, one per side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoneylineOdds {
    pub home: Option<f64>,
    pub away: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadOdds {
    pub home: Option<f64>,
    pub away: Option<f64>,
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalOdds {
    pub over: Option<f64>,
    pub under: Option<f64>,
    pub points: Option<f64>,
}

/// Consensus team markets for one event. Every leaf is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedMarket {
    pub moneyline: MoneylineOdds,
    pub spread: SpreadOdds,
    pub total: TotalOdds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropsMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub teams: Vec<String>,
}

/// A single over/under quote for a player line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropOutcome {
    #[serde(rename = "type")]
    pub outcome_type: String,
    pub odds_decimal: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropBook {
    #[serde(default)]
    pub book_id: Option<String>,
    #[serde(default)]
    pub book_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<PropOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMarket {
    #[serde(default)]
    pub market_id: Option<String>,
    pub market_name: String,
    #[serde(default)]
    pub books: Vec<PropBook>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProps {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub markets: Vec<PlayerMarket>,
}

/// Canonical player-prop odds for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropsDocument {
    #[serde(default)]
    pub metadata: PropsMetadata,
    pub players_props: Vec<PlayerProps>,
}

/// Best available price for one `(type, line)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPrice {
    pub outcome_type: String,
    pub line: f64,
    pub odds: f64,
    pub books: usize,
}

impl BestPrice {
    pub fn matches(&self, outcome_type: &str, line: f64) -> bool {
        self.outcome_type == outcome_type && self.line == line
    }
}

/// A player's market reduced to the best price per line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedPlayerMarket {
    pub player_id: String,
    pub player_name: String,
    pub market_name: String,
    pub lines: Vec<BestPrice>,
}

impl ConsolidatedPlayerMarket {
    /// Best price for an exact `(type, line)` combination
    pub fn best_price(&self, outcome_type: &str, line: f64) -> Option<f64> {
        self.lines
            .iter()
            .find(|l| l.matches(outcome_type, line))
            .map(|l| l.odds)
    }
}

/// Model output for a team outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPrediction {
    #[serde(default)]
    pub game_id: String,
    pub team: String,
    pub prediction_type: String,
    pub probability: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// Model output for a player prop line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropPrediction {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub market: String,
    pub prediction_type: String,
    pub line: f64,
    pub probability: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// Strength of a value recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "STRONG BET")]
    StrongBet,
    #[serde(rename = "BET")]
    Bet,
    #[serde(rename = "NO BET")]
    NoBet,
}

impl Tier {
    pub const STRONG_BET_THRESHOLD: f64 = 0.15;
    pub const BET_THRESHOLD: f64 = 0.05;

    pub fn from_value(value: f64) -> Self {
        if value > Self::STRONG_BET_THRESHOLD {
            Tier::StrongBet
        } else if value > Self::BET_THRESHOLD {
            Tier::Bet
        } else {
            Tier::NoBet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::StrongBet => "STRONG BET",
            Tier::Bet => "BET",
            Tier::NoBet => "NO BET",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a recommendation is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Player {
        player_id: String,
        player_name: String,
        team: String,
        line: f64,
    },
    Team {
        game_id: String,
    },
}

/// A priced model prediction with its expected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecommendation {
    #[serde(flatten)]
    pub subject: Subject,
    pub market: String,
    pub selection: String,
    pub model_prob: f64,
    pub implied_prob: Option<f64>,
    pub odds: f64,
    pub value: f64,
    pub confidence: f64,
    #[serde(rename = "recommendation")]
    pub tier: Tier,
}

impl ValueRecommendation {
    /// Format the recommendation as a readable line
    pub fn format(&self) -> String {
        let subject = match &self.subject {
            Subject::Player {
                player_name,
                team,
                line,
                ..
            } => format!(
                "{} ({}) {} {} {}",
                player_name,
                team,
                self.market,
                self.selection.to_uppercase(),
                line
            ),
            Subject::Team { .. } => format!("{} - {}", self.market, self.selection),
        };

        format!(
            "{} | Odds: {:.2} | Value: {:+.1}% | Model: {:.1}% | Implied: {} | Confidence: {:.0}% | {}",
            subject,
            self.odds,
            self.value * 100.0,
            self.model_prob * 100.0,
            self.implied_prob
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "N/A".to_string()),
            self.confidence * 100.0,
            self.tier
        )
    }
}
