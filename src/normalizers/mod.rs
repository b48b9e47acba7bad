pub mod odds_api;
pub mod sportradar;

use crate::error::OddsError;
use crate::models::{PlayerPropsDocument, RawOddsDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use odds_api::OddsApiNormalizer;
pub use sportradar::{SportradarNormalizer, DEFAULT_PROP_MARKETS};

/// Upstream schema a raw document was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// The Odds API event odds, already in the canonical team shape
    OddsApi,
    /// Sportradar odds comparison (prematch markets or player props)
    Sportradar,
    /// Documents previously normalized and saved by this crate
    Canonical,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OddsApi => "odds-api",
            Provider::Sportradar => "sportradar",
            Provider::Canonical => "canonical",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "odds-api" | "oddsapi" | "the-odds-api" => Ok(Provider::OddsApi),
            "sportradar" => Ok(Provider::Sportradar),
            "canonical" => Ok(Provider::Canonical),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Converts a provider's raw team-market payload into the canonical shape
pub trait TeamOddsNormalizer {
    fn normalize_team_odds(&self, raw: Value) -> Result<RawOddsDocument, OddsError>;
}

/// Converts a provider's raw player-prop payload into the canonical shape
pub trait PlayerPropsNormalizer {
    fn normalize_player_props(&self, raw: Value) -> Result<PlayerPropsDocument, OddsError>;
}

/// Reads documents that are already canonical
pub struct CanonicalNormalizer;

impl TeamOddsNormalizer for CanonicalNormalizer {
    fn normalize_team_odds(&self, raw: Value) -> Result<RawOddsDocument, OddsError> {
        RawOddsDocument::from_value(raw)
    }
}

impl PlayerPropsNormalizer for CanonicalNormalizer {
    fn normalize_player_props(&self, raw: Value) -> Result<PlayerPropsDocument, OddsError> {
        if raw.get("players_props").is_none() {
            return Err(OddsError::format("player props document has no players_props"));
        }
        serde_json::from_value(raw).map_err(|e| OddsError::format(e.to_string()))
    }
}

/// Pick the team-market normalizer for a provider
pub fn team_normalizer(provider: Provider) -> Box<dyn TeamOddsNormalizer> {
    match provider {
        Provider::OddsApi => Box::new(OddsApiNormalizer),
        Provider::Sportradar => Box::new(SportradarNormalizer::default()),
        Provider::Canonical => Box::new(CanonicalNormalizer),
    }
}

/// Pick the player-prop normalizer for a provider
pub fn player_props_normalizer(
    provider: Provider,
    prop_markets: &[String],
) -> Result<Box<dyn PlayerPropsNormalizer>, OddsError> {
    match provider {
        Provider::Sportradar => Ok(Box::new(SportradarNormalizer::new(prop_markets.to_vec()))),
        Provider::Canonical => Ok(Box::new(CanonicalNormalizer)),
        Provider::OddsApi => Err(OddsError::UnsupportedProvider {
            provider,
            target: "player props",
        }),
    }
}

/// Read a JSON number, or a string holding one
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
