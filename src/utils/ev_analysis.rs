use crate::error::{LookupMiss, SkipReason};
use crate::models::{
    ConsolidatedMarket, ConsolidatedPlayerMarket, PlayerPropPrediction, Subject, TeamPrediction,
    Tier, ValueRecommendation,
};
use crate::utils::ev_calculator::{expected_value, implied_probability};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// What happened to a single prediction record
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Recommended(ValueRecommendation),
    /// Nothing in the odds to price it against
    Ignored(LookupMiss),
    /// The record itself is unusable
    Rejected(SkipReason),
}

/// A rejected prediction, with its position in the input list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPrediction {
    pub index: usize,
    pub reason: String,
}

/// Recommendations produced from one prediction list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub recommendations: Vec<ValueRecommendation>,
    pub skipped: Vec<SkippedPrediction>,
}

impl BatchResult {
    fn collect(outcomes: impl IntoIterator<Item = PredictionOutcome>) -> Self {
        let mut batch = BatchResult::default();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                PredictionOutcome::Recommended(rec) => batch.recommendations.push(rec),
                PredictionOutcome::Ignored(miss) => {
                    debug!("Prediction {} not priced: {}", index, miss)
                }
                PredictionOutcome::Rejected(reason) => batch.skipped.push(SkippedPrediction {
                    index,
                    reason: reason.to_string(),
                }),
            }
        }
        batch
    }

    /// The strongest recommendation of the batch
    pub fn top_recommendation(&self) -> Option<&ValueRecommendation> {
        top_recommendation(&self.recommendations)
    }
}

fn check_unit_range(field: &'static str, value: f64) -> Result<(), SkipReason> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SkipReason::OutOfRange { field, value })
    }
}

/// Deserialize one prediction record, rejecting anything malformed
fn parse_prediction<T: DeserializeOwned>(record: &Value) -> Result<T, SkipReason> {
    if !record.is_object() {
        return Err(SkipReason::NotAnObject);
    }
    serde_json::from_value(record.clone()).map_err(|e| SkipReason::Malformed(e.to_string()))
}

/// Price a team prediction against the consensus moneyline
pub fn evaluate_team_prediction(
    record: &Value,
    market: &ConsolidatedMarket,
    home_team: &str,
) -> PredictionOutcome {
    // Only win predictions price against the moneyline; other types are
    // passed over before parsing.
    if let Some(kind) = record.get("prediction_type").and_then(Value::as_str) {
        if kind != "is_win" {
            return PredictionOutcome::Ignored(LookupMiss::NotApplicable(kind.to_string()));
        }
    }

    let prediction: TeamPrediction = match parse_prediction(record) {
        Ok(prediction) => prediction,
        Err(reason) => return PredictionOutcome::Rejected(reason),
    };
    if let Err(reason) = check_unit_range("probability", prediction.probability)
        .and_then(|_| check_unit_range("confidence", prediction.confidence))
    {
        return PredictionOutcome::Rejected(reason);
    }

    let odds = if prediction.team == home_team {
        market.moneyline.home
    } else {
        market.moneyline.away
    };
    let Some(odds) = odds else {
        return PredictionOutcome::Ignored(LookupMiss::MoneylineUnavailable {
            team: prediction.team,
        });
    };

    let value = expected_value(Some(prediction.probability), Some(odds));
    PredictionOutcome::Recommended(ValueRecommendation {
        subject: Subject::Team {
            game_id: prediction.game_id,
        },
        market: "moneyline".to_string(),
        selection: prediction.team,
        model_prob: prediction.probability,
        implied_prob: implied_probability(Some(odds)),
        odds,
        value,
        confidence: prediction.confidence,
        tier: Tier::from_value(value),
    })
}

/// Find value in moneyline predictions for one event
pub fn analyze_team_predictions(
    predictions: &[Value],
    market: &ConsolidatedMarket,
    home_team: &str,
) -> BatchResult {
    BatchResult::collect(
        predictions
            .iter()
            .map(|record| evaluate_team_prediction(record, market, home_team)),
    )
}

/// Consolidated player markets indexed by `(player_id, market_name)`
pub struct PlayerMarketIndex<'a> {
    players: HashMap<&'a str, HashMap<&'a str, &'a ConsolidatedPlayerMarket>>,
}

impl<'a> PlayerMarketIndex<'a> {
    pub fn new(markets: &'a [ConsolidatedPlayerMarket]) -> Self {
        let mut players: HashMap<&str, HashMap<&str, &ConsolidatedPlayerMarket>> = HashMap::new();
        for market in markets {
            players
                .entry(market.player_id.as_str())
                .or_default()
                .entry(market.market_name.as_str())
                .or_insert(market);
        }
        Self { players }
    }

    fn lookup(
        &self,
        player_id: &str,
        market_name: &str,
    ) -> Result<&'a ConsolidatedPlayerMarket, LookupMiss> {
        let markets = self
            .players
            .get(player_id)
            .ok_or_else(|| LookupMiss::Player(player_id.to_string()))?;
        markets
            .get(market_name)
            .copied()
            .ok_or_else(|| LookupMiss::Market {
                player_id: player_id.to_string(),
                market: market_name.to_string(),
            })
    }
}

/// Price a player prop prediction against the best available line
pub fn evaluate_player_prediction(record: &Value, index: &PlayerMarketIndex) -> PredictionOutcome {
    let prediction: PlayerPropPrediction = match parse_prediction(record) {
        Ok(prediction) => prediction,
        Err(reason) => return PredictionOutcome::Rejected(reason),
    };
    if let Err(reason) = check_unit_range("probability", prediction.probability)
        .and_then(|_| check_unit_range("confidence", prediction.confidence))
    {
        return PredictionOutcome::Rejected(reason);
    }

    let market = match index.lookup(&prediction.player_id, &prediction.market) {
        Ok(market) => market,
        Err(miss) => return PredictionOutcome::Ignored(miss),
    };

    let Some(odds) = market.best_price(&prediction.prediction_type, prediction.line) else {
        return PredictionOutcome::Ignored(LookupMiss::Line {
            player_id: prediction.player_id,
            market: prediction.market,
            outcome_type: prediction.prediction_type,
            line: prediction.line,
        });
    };

    let value = expected_value(Some(prediction.probability), Some(odds));
    PredictionOutcome::Recommended(ValueRecommendation {
        subject: Subject::Player {
            player_id: prediction.player_id,
            player_name: prediction.player_name,
            team: prediction.team,
            line: prediction.line,
        },
        market: prediction.market,
        selection: prediction.prediction_type,
        model_prob: prediction.probability,
        implied_prob: implied_probability(Some(odds)),
        odds,
        value,
        confidence: prediction.confidence,
        tier: Tier::from_value(value),
    })
}

/// Find value in player prop predictions for one event
pub fn analyze_player_predictions(
    predictions: &[Value],
    markets: &[ConsolidatedPlayerMarket],
) -> BatchResult {
    let index = PlayerMarketIndex::new(markets);
    BatchResult::collect(
        predictions
            .iter()
            .map(|record| evaluate_player_prediction(record, &index)),
    )
}

/// Highest value recommendation; the first one listed wins a tie
pub fn top_recommendation(recommendations: &[ValueRecommendation]) -> Option<&ValueRecommendation> {
    let mut best: Option<&ValueRecommendation> = None;
    for rec in recommendations {
        if best.map_or(true, |b| rec.value > b.value) {
            best = Some(rec);
        }
    }
    best
}

/// Recommendations sorted by value (descending), keeping input order on ties
pub fn rank_recommendations(recommendations: &[ValueRecommendation]) -> Vec<ValueRecommendation> {
    let mut ranked = recommendations.to_vec();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
}

/// The `top_n` strongest recommendations
pub fn find_top_value_bets(
    recommendations: &[ValueRecommendation],
    top_n: usize,
) -> Vec<ValueRecommendation> {
    rank_recommendations(recommendations)
        .into_iter()
        .take(top_n)
        .collect()
}
