use crate::models::{
    BestPrice, ConsolidatedMarket, ConsolidatedPlayerMarket, MarketKey, MoneylineOdds,
    PlayerPropsDocument, Quote, RawOddsDocument, SpreadOdds, TotalOdds,
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Every quote collected for each team-market leaf, across bookmakers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamQuotes {
    pub moneyline_home: Vec<Quote>,
    pub moneyline_away: Vec<Quote>,
    pub spread_home: Vec<Quote>,
    pub spread_away: Vec<Quote>,
    pub spread_points: Vec<Quote>,
    pub total_over: Vec<Quote>,
    pub total_under: Vec<Quote>,
    pub total_points: Vec<Quote>,
}

/// Sort every bookmaker quote into its leaf.
///
/// Sides are decided by exact match against the home team name; anything
/// else (including a draw) lands on the away side.
pub fn collect_team_quotes(document: &RawOddsDocument) -> TeamQuotes {
    let mut quotes = TeamQuotes::default();

    for bookmaker in &document.bookmakers {
        for market in &bookmaker.markets {
            match market.key {
                MarketKey::Moneyline => {
                    for outcome in &market.outcomes {
                        if outcome.name == document.home_team {
                            quotes.moneyline_home.push(outcome.price.clone());
                        } else {
                            quotes.moneyline_away.push(outcome.price.clone());
                        }
                    }
                }
                MarketKey::Spread => {
                    for outcome in &market.outcomes {
                        if outcome.name == document.home_team {
                            quotes.spread_home.push(outcome.price.clone());
                            quotes.spread_points.push(outcome.point.clone());
                        } else {
                            quotes.spread_away.push(outcome.price.clone());
                        }
                    }
                }
                MarketKey::Total => {
                    for outcome in &market.outcomes {
                        if outcome.name == "Over" {
                            quotes.total_over.push(outcome.price.clone());
                            quotes.total_points.push(outcome.point.clone());
                        } else {
                            quotes.total_under.push(outcome.price.clone());
                        }
                    }
                }
                MarketKey::Other(ref key) => {
                    debug!("Ignoring market {} from {}", key, bookmaker.key);
                }
            }
        }
    }

    quotes
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price >= 1.0
}

fn is_valid_point(point: f64) -> bool {
    point.is_finite()
}

/// Mean of the usable quotes in a leaf.
///
/// Missing quotes are skipped. A malformed quote poisons only this leaf.
/// Values are summed in sorted order so the result does not depend on the
/// order bookmakers were listed in.
fn mean_quote(leaf: &str, quotes: &[Quote], accept: fn(f64) -> bool) -> Option<f64> {
    let mut values = Vec::with_capacity(quotes.len());

    for quote in quotes {
        match quote {
            Quote::Missing => {}
            Quote::Value(v) if accept(*v) => values.push(*v),
            Quote::Value(v) => debug!("Rejecting out of range {} quote {}", leaf, v),
            Quote::Malformed(raw) => {
                warn!("Malformed {} quote {}, leaving leaf empty", leaf, raw);
                return None;
            }
        }
    }

    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

impl TeamQuotes {
    /// Reduce each leaf to its mean price (or line)
    pub fn consolidate(&self) -> ConsolidatedMarket {
        ConsolidatedMarket {
            moneyline: MoneylineOdds {
                home: mean_quote("moneyline.home", &self.moneyline_home, is_valid_price),
                away: mean_quote("moneyline.away", &self.moneyline_away, is_valid_price),
            },
            spread: SpreadOdds {
                home: mean_quote("spread.home", &self.spread_home, is_valid_price),
                away: mean_quote("spread.away", &self.spread_away, is_valid_price),
                points: mean_quote("spread.points", &self.spread_points, is_valid_point),
            },
            total: TotalOdds {
                over: mean_quote("total.over", &self.total_over, is_valid_price),
                under: mean_quote("total.under", &self.total_under, is_valid_price),
                points: mean_quote("total.points", &self.total_points, is_valid_point),
            },
        }
    }
}

/// Consensus odds for a team event
pub fn consolidate_team_odds(document: &RawOddsDocument) -> ConsolidatedMarket {
    collect_team_quotes(document).consolidate()
}

/// Reduce each player market to the best price per `(type, line)`.
///
/// Keyed by `(player_id, market_name)`; when a pair repeats the first one
/// listed wins.
pub fn consolidate_player_props(document: &PlayerPropsDocument) -> Vec<ConsolidatedPlayerMarket> {
    let mut consolidated: Vec<ConsolidatedPlayerMarket> = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for player in &document.players_props {
        for market in &player.markets {
            let key = (player.player_id.as_str(), market.market_name.as_str());
            if !seen.insert(key) {
                debug!(
                    "Duplicate market {} for player {}, keeping the first",
                    market.market_name, player.player_id
                );
                continue;
            }

            let mut lines: Vec<BestPrice> = Vec::new();
            for book in &market.books {
                for outcome in &book.outcomes {
                    if !is_valid_price(outcome.odds_decimal) {
                        debug!(
                            "Rejecting out of range prop price {} for {}",
                            outcome.odds_decimal, player.player_id
                        );
                        continue;
                    }

                    match lines
                        .iter_mut()
                        .find(|l| l.matches(&outcome.outcome_type, outcome.total))
                    {
                        Some(best) => {
                            best.books += 1;
                            if outcome.odds_decimal > best.odds {
                                best.odds = outcome.odds_decimal;
                            }
                        }
                        None => lines.push(BestPrice {
                            outcome_type: outcome.outcome_type.clone(),
                            line: outcome.total,
                            odds: outcome.odds_decimal,
                            books: 1,
                        }),
                    }
                }
            }

            consolidated.push(ConsolidatedPlayerMarket {
                player_id: player.player_id.clone(),
                player_name: player.player_name.clone(),
                market_name: market.market_name.clone(),
                lines,
            });
        }
    }

    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerMarket, PlayerProps, PropBook, PropOutcome};
    use serde_json::json;

    fn sample_document(bookmakers: serde_json::Value) -> RawOddsDocument {
        RawOddsDocument::from_value(json!({
            "id": "evt-1",
            "home_team": "Lakers",
            "away_team": "Celtics",
            "commence_time": "2024-06-10T00:30:00Z",
            "bookmakers": bookmakers
        }))
        .unwrap()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("leaf should be populated");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn full_bookmakers() -> serde_json::Value {
        json!([
            {"key": "book_a", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": 2.0},
                    {"name": "Celtics", "price": 1.8}
                ]},
                {"key": "spreads", "outcomes": [
                    {"name": "Lakers", "price": 1.9, "point": 3.5},
                    {"name": "Celtics", "price": 1.9, "point": -3.5}
                ]},
                {"key": "totals", "outcomes": [
                    {"name": "Over", "price": 1.85, "point": 220.5},
                    {"name": "Under", "price": 1.95, "point": 220.5}
                ]}
            ]},
            {"key": "book_b", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": 2.5}
                ]},
                {"key": "spreads", "outcomes": [
                    {"name": "Lakers", "price": 2.0, "point": 4.5}
                ]},
                {"key": "totals", "outcomes": [
                    {"name": "Over", "price": 1.75, "point": 221.5}
                ]}
            ]}
        ])
    }

    #[test]
    fn test_consolidate_means() {
        let market = consolidate_team_odds(&sample_document(full_bookmakers()));

        assert_eq!(market.moneyline.home, Some(2.25));
        assert_eq!(market.moneyline.away, Some(1.8));
        assert_close(market.spread.home, 1.95);
        assert_eq!(market.spread.away, Some(1.9));
        assert_eq!(market.spread.points, Some(4.0));
        assert_close(market.total.over, 1.8);
        assert_eq!(market.total.under, Some(1.95));
        assert_eq!(market.total.points, Some(221.0));
    }

    #[test]
    fn test_consolidate_always_has_six_leaves() {
        let market = consolidate_team_odds(&sample_document(json!([])));
        assert_eq!(market, ConsolidatedMarket::default());

        let json = serde_json::to_value(&market).unwrap();
        for (section, keys) in [
            ("moneyline", vec!["home", "away"]),
            ("spread", vec!["home", "away", "points"]),
            ("total", vec!["over", "under", "points"]),
        ] {
            for key in keys {
                assert!(json[section].get(key).is_some(), "{section}.{key}");
                assert!(json[section][key].is_null());
            }
        }
    }

    #[test]
    fn test_consolidate_is_order_independent() {
        let bookmakers = json!([
            {"key": "a", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": 2.05}]}
            ]},
            {"key": "b", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": 1.93}]}
            ]},
            {"key": "c", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": 2.11}]}
            ]}
        ]);
        let forward = consolidate_team_odds(&sample_document(bookmakers.clone()));

        let mut reversed_books = bookmakers.as_array().unwrap().clone();
        reversed_books.reverse();
        let reversed = consolidate_team_odds(&sample_document(json!(reversed_books)));

        let mut rotated_books = bookmakers.as_array().unwrap().clone();
        rotated_books.rotate_left(1);
        let rotated = consolidate_team_odds(&sample_document(json!(rotated_books)));

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_malformed_quote_degrades_only_its_leaf() {
        let market = consolidate_team_odds(&sample_document(json!([
            {"key": "a", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": "evens"},
                    {"name": "Celtics", "price": 1.8}
                ]}
            ]},
            {"key": "b", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": 2.0},
                    {"name": "Celtics", "price": 2.0}
                ]}
            ]}
        ])));

        assert_eq!(market.moneyline.home, None);
        assert_close(market.moneyline.away, 1.9);
    }

    #[test]
    fn test_null_quotes_are_skipped() {
        let market = consolidate_team_odds(&sample_document(json!([
            {"key": "a", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": null}]},
                {"key": "totals", "outcomes": [{"name": "Over", "price": 1.9}]}
            ]},
            {"key": "b", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": 2.2}]},
                {"key": "totals", "outcomes": [{"name": "Over", "price": 1.9, "point": 210.5}]}
            ]}
        ])));

        assert_eq!(market.moneyline.home, Some(2.2));
        assert_eq!(market.total.over, Some(1.9));
        assert_eq!(market.total.points, Some(210.5));
    }

    #[test]
    fn test_out_of_range_prices_are_rejected() {
        let market = consolidate_team_odds(&sample_document(json!([
            {"key": "a", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": 0.0},
                    {"name": "Celtics", "price": -110}
                ]}
            ]},
            {"key": "b", "markets": [
                {"key": "h2h", "outcomes": [{"name": "Lakers", "price": 1.5}]}
            ]}
        ])));

        assert_eq!(market.moneyline.home, Some(1.5));
        assert_eq!(market.moneyline.away, None);
    }

    #[test]
    fn test_draw_goes_to_away_bucket() {
        let quotes = collect_team_quotes(&sample_document(json!([
            {"key": "a", "markets": [
                {"key": "h2h", "outcomes": [
                    {"name": "Lakers", "price": 2.0},
                    {"name": "Celtics", "price": 3.0},
                    {"name": "Draw", "price": 9.0}
                ]},
                {"key": "player_points", "outcomes": [{"name": "Over", "price": 1.9}]}
            ]}
        ])));

        assert_eq!(quotes.moneyline_home, vec![Quote::Value(2.0)]);
        assert_eq!(
            quotes.moneyline_away,
            vec![Quote::Value(3.0), Quote::Value(9.0)]
        );
        assert!(quotes.total_over.is_empty());
    }

    fn prop_book(outcomes: &[(&str, f64, f64)]) -> PropBook {
        PropBook {
            book_id: None,
            book_name: None,
            outcomes: outcomes
                .iter()
                .map(|(kind, odds, total)| PropOutcome {
                    outcome_type: kind.to_string(),
                    odds_decimal: *odds,
                    total: *total,
                })
                .collect(),
        }
    }

    fn props_document() -> PlayerPropsDocument {
        PlayerPropsDocument {
            players_props: vec![PlayerProps {
                player_id: "sr:player:1".to_string(),
                player_name: "LeBron James".to_string(),
                team_id: None,
                markets: vec![
                    PlayerMarket {
                        market_id: None,
                        market_name: "total points (incl. overtime)".to_string(),
                        books: vec![
                            prop_book(&[("over", 1.8, 24.5), ("under", 2.0, 24.5)]),
                            prop_book(&[("over", 2.1, 24.5), ("over", 2.6, 26.5)]),
                            prop_book(&[("over", 1.95, 24.5)]),
                        ],
                    },
                    PlayerMarket {
                        market_id: None,
                        market_name: "total points (incl. overtime)".to_string(),
                        books: vec![prop_book(&[("over", 9.0, 24.5)])],
                    },
                ],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_player_props_take_best_price() {
        let markets = consolidate_player_props(&props_document());
        assert_eq!(markets.len(), 1);

        let market = &markets[0];
        assert_eq!(market.best_price("over", 24.5), Some(2.1));
        assert_eq!(market.best_price("under", 24.5), Some(2.0));
        assert_eq!(market.best_price("over", 26.5), Some(2.6));
        assert_eq!(market.best_price("under", 26.5), None);

        let over = market
            .lines
            .iter()
            .find(|l| l.matches("over", 24.5))
            .unwrap();
        assert_eq!(over.books, 3);
    }
}
