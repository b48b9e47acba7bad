use super::TeamOddsNormalizer;
use crate::error::OddsError;
use crate::models::RawOddsDocument;
use serde_json::Value;

/// The Odds API already returns events in the canonical team shape; this
/// validates the payload and tags where it came from.
pub struct OddsApiNormalizer;

impl TeamOddsNormalizer for OddsApiNormalizer {
    fn normalize_team_odds(&self, raw: Value) -> Result<RawOddsDocument, OddsError> {
        let mut document = RawOddsDocument::from_value(raw)?;
        if document.source.is_none() {
            document.source = Some("the-odds-api".to_string());
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketKey, Quote};
    use serde_json::json;

    #[test]
    fn test_normalize_event() {
        let raw = json!({
            "id": "e912304de2b2ce35b473ce2ecd3d1502",
            "sport_key": "basketball_nba",
            "sport_title": "NBA",
            "commence_time": "2024-06-10T00:30:00Z",
            "home_team": "Boston Celtics",
            "away_team": "Dallas Mavericks",
            "bookmakers": [{
                "key": "draftkings",
                "title": "DraftKings",
                "last_update": "2024-06-09T18:00:00Z",
                "markets": [{
                    "key": "spreads",
                    "outcomes": [
                        {"name": "Boston Celtics", "price": 1.91, "point": -6.5},
                        {"name": "Dallas Mavericks", "price": 1.91, "point": 6.5}
                    ]
                }]
            }]
        });

        let doc = OddsApiNormalizer.normalize_team_odds(raw).unwrap();
        assert_eq!(doc.source.as_deref(), Some("the-odds-api"));
        assert_eq!(doc.home_team, "Boston Celtics");

        let market = &doc.bookmakers[0].markets[0];
        assert_eq!(market.key, MarketKey::Spread);
        assert_eq!(market.outcomes[0].point, Quote::Value(-6.5));
    }

    #[test]
    fn test_missing_bookmakers_is_format_error() {
        let result = OddsApiNormalizer.normalize_team_odds(json!({"home_team": "Boston Celtics"}));
        assert!(matches!(result, Err(OddsError::Format(_))));
    }
}
