pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalizers;
pub mod utils;

pub use api::*;
pub use error::{LookupMiss, OddsError, SkipReason};
pub use models::*;
pub use normalizers::Provider;
pub use utils::*;

use chrono::Local;
use normalizers::{
    player_props_normalizer, team_normalizer, PlayerPropsNormalizer, TeamOddsNormalizer,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utils::consolidation::{consolidate_player_props, consolidate_team_odds};
use utils::ev_analysis::{
    analyze_player_predictions, analyze_team_predictions, rank_recommendations, SkippedPrediction,
};

/// Identity of the analysed team event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysisMetadata {
    pub generated_at: String,
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: Option<String>,
    pub data_source: String,
}

/// Everything produced by one team-market analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysis {
    pub metadata: TeamAnalysisMetadata,
    pub model_predictions: Vec<Value>,
    #[serde(rename = "odds_consolidadas")]
    pub consolidated_odds: ConsolidatedMarket,
    pub value_analysis: Vec<ValueRecommendation>,
    pub top_recommendation: Option<ValueRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_predictions: Vec<SkippedPrediction>,
}

/// Identity of the analysed player-prop event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropsAnalysisMetadata {
    pub generated_at: String,
    pub event_id: String,
    pub teams: Vec<String>,
    pub data_source: String,
}

/// Everything produced by one player-prop analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropsAnalysis {
    pub metadata: PlayerPropsAnalysisMetadata,
    pub model_predictions: Vec<Value>,
    pub odds_player_props: Vec<PlayerProps>,
    pub value_analysis: Vec<ValueRecommendation>,
    pub top_recommendation: Option<ValueRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_predictions: Vec<SkippedPrediction>,
}

/// Pull the prediction list out of a model document (`{"predictions": [...]}`)
pub fn model_predictions(model: &Value) -> Result<Vec<Value>, OddsError> {
    model
        .get("predictions")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| OddsError::format("model document has no predictions list"))
}

fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Consolidate a canonical team document and price the model predictions against it
pub fn analyze_team_odds(document: &RawOddsDocument, predictions: Vec<Value>) -> TeamAnalysis {
    let consolidated_odds = consolidate_team_odds(document);
    let batch = analyze_team_predictions(&predictions, &consolidated_odds, &document.home_team);
    let top_recommendation = batch.top_recommendation().cloned();

    info!(
        "{} vs {}: {} recommendations, {} predictions skipped",
        document.home_team,
        document.away_team,
        batch.recommendations.len(),
        batch.skipped.len()
    );

    TeamAnalysis {
        metadata: TeamAnalysisMetadata {
            generated_at: now_timestamp(),
            game_id: document.id.clone(),
            home_team: document.home_team.clone(),
            away_team: document.away_team.clone(),
            commence_time: document.commence_time.clone(),
            data_source: document.source.as_deref().unwrap_or("API").to_string(),
        },
        model_predictions: predictions,
        consolidated_odds,
        value_analysis: batch.recommendations,
        top_recommendation,
        skipped_predictions: batch.skipped,
    }
}

/// Normalize a raw provider document, then run the team analysis
pub fn analyze_team_event(
    provider: Provider,
    raw_odds: Value,
    model: &Value,
) -> Result<TeamAnalysis, OddsError> {
    let document = team_normalizer(provider).normalize_team_odds(raw_odds)?;
    let predictions = model_predictions(model)?;
    Ok(analyze_team_odds(&document, predictions))
}

/// Consolidate a canonical props document and price the model predictions against it
pub fn analyze_player_props(
    document: PlayerPropsDocument,
    predictions: Vec<Value>,
) -> PlayerPropsAnalysis {
    let markets = consolidate_player_props(&document);
    let batch = analyze_player_predictions(&predictions, &markets);
    let top_recommendation = batch.top_recommendation().cloned();

    info!(
        "Event {}: {} player markets, {} recommendations, {} predictions skipped",
        document.metadata.event_id,
        markets.len(),
        batch.recommendations.len(),
        batch.skipped.len()
    );

    PlayerPropsAnalysis {
        metadata: PlayerPropsAnalysisMetadata {
            generated_at: now_timestamp(),
            event_id: document.metadata.event_id,
            teams: document.metadata.teams,
            data_source: "API+model".to_string(),
        },
        model_predictions: predictions,
        odds_player_props: document.players_props,
        value_analysis: batch.recommendations,
        top_recommendation,
        skipped_predictions: batch.skipped,
    }
}

/// Normalize a raw provider props document, then run the player-prop analysis
pub fn analyze_player_props_event(
    provider: Provider,
    raw_props: Value,
    model: &Value,
    prop_markets: &[String],
) -> Result<PlayerPropsAnalysis, OddsError> {
    let document =
        player_props_normalizer(provider, prop_markets)?.normalize_player_props(raw_props)?;
    let predictions = model_predictions(model)?;
    Ok(analyze_player_props(document, predictions))
}

fn format_odds(odds: Option<f64>) -> String {
    odds.map(|o| format!("{:.2}", o))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_ranked(out: &mut String, recommendations: &[ValueRecommendation]) {
    if recommendations.is_empty() {
        out.push_str("No value recommendations.\n");
        return;
    }
    for (i, rec) in rank_recommendations(recommendations).iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rec.format()));
    }
}

fn format_top(out: &mut String, top: Option<&ValueRecommendation>) {
    out.push_str("\nTOP RECOMMENDATION\n");
    match top {
        Some(rec) => out.push_str(&format!("{}\n", rec.format())),
        None => out.push_str("No recommendations with positive value\n"),
    }
}

impl TeamAnalysis {
    /// Human readable summary of the run
    pub fn summary(&self) -> String {
        let meta = &self.metadata;
        let odds = &self.consolidated_odds;
        let mut out = String::new();

        out.push_str(&format!("{} vs {}\n", meta.home_team, meta.away_team));
        out.push_str(&format!(
            "Start: {} | Source: {}\n",
            meta.commence_time.as_deref().unwrap_or("unknown"),
            meta.data_source
        ));

        out.push_str("\nCONSOLIDATED ODDS\n");
        out.push_str(&format!(
            "Moneyline - {}: {} | {}: {}\n",
            meta.home_team,
            format_odds(odds.moneyline.home),
            meta.away_team,
            format_odds(odds.moneyline.away)
        ));
        out.push_str(&format!(
            "Spread ({}) - home: {} | away: {}\n",
            odds.spread
                .points
                .map(|p| format!("{:+.1}", p))
                .unwrap_or_else(|| "N/A".to_string()),
            format_odds(odds.spread.home),
            format_odds(odds.spread.away)
        ));
        out.push_str(&format!(
            "Total ({}) - over: {} | under: {}\n",
            odds.total
                .points
                .map(|p| format!("{:.1}", p))
                .unwrap_or_else(|| "N/A".to_string()),
            format_odds(odds.total.over),
            format_odds(odds.total.under)
        ));

        out.push_str("\nVALUE ANALYSIS\n");
        format_ranked(&mut out, &self.value_analysis);
        format_top(&mut out, self.top_recommendation.as_ref());

        for skipped in &self.skipped_predictions {
            out.push_str(&format!(
                "Skipped prediction #{}: {}\n",
                skipped.index, skipped.reason
            ));
        }
        out
    }
}

impl PlayerPropsAnalysis {
    /// Human readable summary of the run
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Event {} ({})\n",
            self.metadata.event_id,
            self.metadata.teams.join(" vs ")
        ));
        out.push_str(&format!(
            "{} players with tracked markets\n",
            self.odds_player_props.len()
        ));

        out.push_str("\nPLAYER PROPS\n");
        format_ranked(&mut out, &self.value_analysis);
        format_top(&mut out, self.top_recommendation.as_ref());

        for skipped in &self.skipped_predictions {
            out.push_str(&format!(
                "Skipped prediction #{}: {}\n",
                skipped.index, skipped.reason
            ));
        }
        out
    }
}
