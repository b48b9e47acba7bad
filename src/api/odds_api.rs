use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";

/// Client for The Odds API
pub struct OddsApiClient {
    api_key: String,
    regions: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String, regions: String) -> Self {
        Self {
            api_key,
            regions,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.require_odds_api_key()?.to_string(),
            config.odds_api_regions.clone(),
        ))
    }

    /// Fetch moneyline, spread and total odds for one event, in decimal format.
    /// The response is the raw event document, ready for the odds-api normalizer.
    pub async fn fetch_event_odds(&self, sport_key: &str, event_id: &str) -> Result<Value> {
        let url = format!(
            "{}/sports/{}/events/{}/odds",
            ODDS_API_BASE_URL, sport_key, event_id
        );
        info!("Fetching odds for event {} ({})", event_id, sport_key);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", "h2h,spreads,totals"),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await
            .context("Failed to fetch odds from The Odds API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse Odds API response")
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<()> {
        let url = format!("{}/sports", ODDS_API_BASE_URL);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        if let Some(remaining) = response.headers().get("x-requests-remaining") {
            info!("API requests remaining: {:?}", remaining);
        }

        if let Some(used) = response.headers().get("x-requests-used") {
            info!("API requests used: {:?}", used);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizers::{OddsApiNormalizer, TeamOddsNormalizer};

    #[tokio::test]
    #[ignore]
    async fn test_fetch_event_odds() {
        let config = Config::from_env();
        let client = OddsApiClient::from_config(&config).unwrap();
        let event_id = std::env::var("ODDS_API_EVENT_ID").expect("ODDS_API_EVENT_ID not set");

        let raw = client
            .fetch_event_odds("basketball_nba", &event_id)
            .await
            .unwrap();
        let doc = OddsApiNormalizer.normalize_team_odds(raw).unwrap();
        assert!(!doc.home_team.is_empty());
    }
}
