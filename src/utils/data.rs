use crate::models::{Subject, ValueRecommendation};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Save any serializable value as pretty JSON
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize data")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write file {}", path.display()))?;
    Ok(())
}

/// Load a JSON file
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Most recent `<prefix>*.json` file in a directory.
///
/// Saved files carry a sortable timestamp in their name, so the newest is
/// the greatest name.
pub fn latest_odds_file(dir: impl AsRef<Path>, prefix: &str) -> Result<Option<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;

    let mut latest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(prefix) || !name.ends_with(".json") {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| name > *best) {
            latest = Some((name, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

/// Save recommendations to CSV
pub fn save_recommendations_to_csv(
    recommendations: &[ValueRecommendation],
    filename: impl AsRef<Path>,
) -> Result<()> {
    let filename = filename.as_ref();
    let mut writer = csv::Writer::from_path(filename)
        .with_context(|| format!("Failed to create CSV file {}", filename.display()))?;

    writer.write_record([
        "Subject",
        "Player",
        "Team",
        "Market",
        "Selection",
        "Line",
        "Odds",
        "Model Probability (%)",
        "Implied Probability (%)",
        "Value (%)",
        "Confidence (%)",
        "Recommendation",
    ])?;

    for rec in recommendations {
        let (subject, player, team, line) = match &rec.subject {
            Subject::Team { game_id } => (
                game_id.clone(),
                String::new(),
                String::new(),
                String::new(),
            ),
            Subject::Player {
                player_id,
                player_name,
                team,
                line,
            } => (
                player_id.clone(),
                player_name.clone(),
                team.clone(),
                format!("{:.1}", line),
            ),
        };

        writer.write_record([
            subject,
            player,
            team,
            rec.market.clone(),
            rec.selection.clone(),
            line,
            format!("{:.2}", rec.odds),
            format!("{:.1}", rec.model_prob * 100.0),
            rec.implied_prob
                .map(|p| format!("{:.1}", p * 100.0))
                .unwrap_or_default(),
            format!("{:.2}", rec.value * 100.0),
            format!("{:.0}", rec.confidence * 100.0),
            rec.tier.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("odds_value_ev_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_latest_odds_file() {
        let dir = scratch_dir("latest");
        for name in [
            "odds_completas_20240608_120000.json",
            "odds_completas_20240610_090000.json",
            "odds_completas_20240609_230000.json",
            "odds_completas_20240611_000000.txt",
            "other_20250101.json",
        ] {
            std::fs::write(dir.join(name), "{}").unwrap();
        }

        let latest = latest_odds_file(&dir, "odds_completas_").unwrap().unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "odds_completas_20240610_090000.json"
        );
        assert!(latest_odds_file(&dir, "missing_").unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_and_csv_round_trip() {
        let dir = scratch_dir("files");
        let rec = ValueRecommendation {
            subject: Subject::Player {
                player_id: "sr:player:1".to_string(),
                player_name: "Tatum, Jayson".to_string(),
                team: "Boston Celtics".to_string(),
                line: 26.5,
            },
            market: "total points".to_string(),
            selection: "over".to_string(),
            model_prob: 0.6,
            implied_prob: Some(0.5),
            odds: 2.0,
            value: 0.2,
            confidence: 0.7,
            tier: Tier::StrongBet,
        };

        let json_path = dir.join("nested").join("recs.json");
        save_json(&vec![rec.clone()], &json_path).unwrap();
        let loaded: Vec<ValueRecommendation> = load_json(&json_path).unwrap();
        assert_eq!(loaded, vec![rec.clone()]);

        let csv_path = dir.join("recs.csv");
        save_recommendations_to_csv(&[rec], &csv_path).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        let expected = "sr:player:1,\"Tatum, Jayson\",Boston Celtics,total points,over,26.5,2.00";
        assert!(lines[1].starts_with(expected));
        assert!(lines[1].ends_with("STRONG BET"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
