use super::{parse_number, PlayerPropsNormalizer, TeamOddsNormalizer};
use crate::error::OddsError;
use crate::models::{
    MarketKey, PlayerMarket, PlayerProps, PlayerPropsDocument, PropBook, PropOutcome,
    PropsMetadata, Quote, RawBookmaker, RawMarket, RawOddsDocument, RawOutcome,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Player-prop market name fragments worth keeping
pub const DEFAULT_PROP_MARKETS: &[&str] = &[
    "total points",
    "total assists",
    "total rebounds",
    "total 3-point",
    "total steals",
    "total blocks",
    "total turnovers",
    "total 2-point",
    "double double",
    "triple double",
];

/// Response of the odds comparison `sport_event_markets` endpoint
#[derive(Debug, Deserialize)]
struct SportEventMarkets {
    sport_event: SportEvent,
    #[serde(default)]
    markets: Vec<SportradarMarket>,
}

/// Response of the odds comparison `players_props` endpoint
#[derive(Debug, Deserialize)]
struct PlayersPropsResponse {
    sport_event_players_props: SportEventPlayersProps,
}

#[derive(Debug, Deserialize)]
struct SportEventPlayersProps {
    #[serde(default)]
    sport_event: Option<SportEvent>,
    #[serde(default)]
    players_props: Vec<SportradarPlayerProps>,
}

#[derive(Debug, Deserialize)]
struct SportEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    qualifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SportradarPlayerProps {
    player: SportradarPlayer,
    #[serde(default)]
    markets: Vec<SportradarMarket>,
}

#[derive(Debug, Deserialize)]
struct SportradarPlayer {
    id: String,
    name: String,
    #[serde(default)]
    competitor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SportradarMarket {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    books: Vec<SportradarBook>,
}

#[derive(Debug, Deserialize)]
struct SportradarBook {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    outcomes: Vec<SportradarOutcome>,
}

#[derive(Debug, Deserialize)]
struct SportradarOutcome {
    #[serde(rename = "type", default)]
    outcome_type: String,
    #[serde(default)]
    odds_decimal: Value,
    #[serde(default)]
    handicap: Value,
    #[serde(default)]
    total: Value,
}

/// Map a Sportradar market name onto the canonical market key
fn team_market_key(name: &str) -> Option<MarketKey> {
    match name {
        "winner (incl. overtime)" | "1x2" => Some(MarketKey::Moneyline),
        "spread (incl. overtime)" | "handicap (incl. overtime)" => Some(MarketKey::Spread),
        "total (incl. overtime)" => Some(MarketKey::Total),
        _ => None,
    }
}

fn quote(value: &Value) -> Quote {
    match value {
        Value::Null => Quote::Missing,
        other => match parse_number(other) {
            Some(v) => Quote::Value(v),
            None => Quote::Malformed(other.clone()),
        },
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Book names are grouped case- and space-insensitively ("Bet 365" == "bet365")
fn book_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// Normalizer for the Sportradar odds comparison APIs
pub struct SportradarNormalizer {
    prop_markets: Vec<String>,
}

impl Default for SportradarNormalizer {
    /// Tracks the built-in prop markets; team markets need no configuration
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SportradarNormalizer {
    pub fn new(prop_markets: Vec<String>) -> Self {
        let prop_markets = if prop_markets.is_empty() {
            DEFAULT_PROP_MARKETS.iter().map(|m| m.to_string()).collect()
        } else {
            prop_markets.into_iter().map(|m| m.to_lowercase()).collect()
        };
        Self { prop_markets }
    }

    fn is_tracked_prop_market(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.prop_markets.iter().any(|m| name.contains(m.as_str()))
    }

    fn team_outcome(
        key: &MarketKey,
        outcome: &SportradarOutcome,
        home_team: &str,
        away_team: &str,
    ) -> Option<RawOutcome> {
        let (name, point) = match (key, outcome.outcome_type.as_str()) {
            (MarketKey::Moneyline, "home") => (home_team.to_string(), Quote::Missing),
            (MarketKey::Moneyline, "away") => (away_team.to_string(), Quote::Missing),
            (MarketKey::Spread, "home_handicap") => {
                (home_team.to_string(), quote(&outcome.handicap))
            }
            (MarketKey::Spread, "away_handicap") => {
                (away_team.to_string(), quote(&outcome.handicap))
            }
            (MarketKey::Total, "over") => ("Over".to_string(), quote(&outcome.total)),
            (MarketKey::Total, "under") => ("Under".to_string(), quote(&outcome.total)),
            // draw and anything else we have no bucket for
            _ => return None,
        };

        Some(RawOutcome {
            name,
            price: quote(&outcome.odds_decimal),
            point,
        })
    }
}

impl TeamOddsNormalizer for SportradarNormalizer {
    fn normalize_team_odds(&self, raw: Value) -> Result<RawOddsDocument, OddsError> {
        let response: SportEventMarkets = serde_json::from_value(raw)
            .map_err(|e| OddsError::format(format!("sportradar prematch: {}", e)))?;

        let mut home_team = String::new();
        let mut away_team = String::new();
        for competitor in &response.sport_event.competitors {
            match competitor.qualifier.as_deref() {
                Some("home") => home_team = competitor.name.clone(),
                Some("away") => away_team = competitor.name.clone(),
                _ => {}
            }
        }

        let mut bookmakers: Vec<RawBookmaker> = Vec::new();
        let mut book_index: HashMap<String, usize> = HashMap::new();

        for market in &response.markets {
            let Some(key) = team_market_key(&market.name) else {
                debug!("Skipping sportradar market {}", market.name);
                continue;
            };

            for book in &market.books {
                let outcomes: Vec<RawOutcome> = book
                    .outcomes
                    .iter()
                    .filter_map(|o| Self::team_outcome(&key, o, &home_team, &away_team))
                    .collect();
                if outcomes.is_empty() {
                    continue;
                }

                let bk = book_key(&book.name);
                let index = *book_index.entry(bk.clone()).or_insert_with(|| {
                    bookmakers.push(RawBookmaker {
                        key: bk,
                        title: Some(book.name.clone()),
                        last_update: None,
                        markets: Vec::new(),
                    });
                    bookmakers.len() - 1
                });

                bookmakers[index].markets.push(RawMarket {
                    key: key.clone(),
                    outcomes,
                });
            }
        }

        Ok(RawOddsDocument {
            id: response.sport_event.id,
            sport_key: None,
            sport_title: None,
            commence_time: response.sport_event.start_time,
            home_team,
            away_team,
            source: Some("sportradar".to_string()),
            bookmakers,
        })
    }
}

impl PlayerPropsNormalizer for SportradarNormalizer {
    fn normalize_player_props(&self, raw: Value) -> Result<PlayerPropsDocument, OddsError> {
        let response: PlayersPropsResponse = serde_json::from_value(raw)
            .map_err(|e| OddsError::format(format!("sportradar player props: {}", e)))?;
        let props = response.sport_event_players_props;

        let metadata = match props.sport_event {
            Some(event) => PropsMetadata {
                generated_at: None,
                event_id: event.id,
                teams: event.competitors.into_iter().map(|c| c.name).collect(),
            },
            None => PropsMetadata::default(),
        };

        let mut players_props = Vec::new();
        for entry in props.players_props {
            let markets: Vec<PlayerMarket> = entry
                .markets
                .iter()
                .filter(|m| self.is_tracked_prop_market(&m.name))
                .map(|m| PlayerMarket {
                    market_id: id_string(&m.id),
                    market_name: m.name.clone(),
                    books: prop_books(&entry.player.id, &m.books),
                })
                .collect();

            // Players with nothing we track are dropped
            if markets.is_empty() {
                continue;
            }

            players_props.push(PlayerProps {
                player_id: entry.player.id,
                player_name: entry.player.name,
                team_id: entry.player.competitor_id,
                markets,
            });
        }

        Ok(PlayerPropsDocument {
            metadata,
            players_props,
        })
    }
}

fn prop_books(player_id: &str, books: &[SportradarBook]) -> Vec<PropBook> {
    books.iter().map(|b| prop_book(player_id, b)).collect()
}

fn prop_book(player_id: &str, book: &SportradarBook) -> PropBook {
    let outcomes = book
        .outcomes
        .iter()
        .filter_map(|o| {
            let odds = parse_number(&o.odds_decimal);
            let total = parse_number(&o.total);
            match (odds, total) {
                (Some(odds_decimal), Some(total)) => Some(PropOutcome {
                    outcome_type: o.outcome_type.clone(),
                    odds_decimal,
                    total,
                }),
                _ => {
                    warn!(
                        "Skipping prop outcome for {} at {}: odds {} total {}",
                        player_id, book.name, o.odds_decimal, o.total
                    );
                    None
                }
            }
        })
        .collect();

    PropBook {
        book_id: id_string(&book.id),
        book_name: Some(book.name.clone()),
        outcomes,
    }
}
