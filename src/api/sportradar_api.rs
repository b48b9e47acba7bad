use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

const SPORTRADAR_BASE_URL: &str = "https://api.sportradar.com";

/// Client for the Sportradar odds comparison APIs
pub struct SportradarClient {
    api_key: String,
    access_level: String,
    language: String,
    client: reqwest::Client,
}

impl SportradarClient {
    pub fn new(api_key: String, access_level: String, language: String) -> Self {
        Self {
            api_key,
            access_level,
            language,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.require_sportradar_api_key()?.to_string(),
            config.sportradar_access_level.clone(),
            config.sportradar_language.clone(),
        ))
    }

    /// Accepts a bare numeric id or a full `sr:sport_event:<id>` urn
    fn event_urn(event_id: &str) -> String {
        if event_id.starts_with("sr:") {
            event_id.replace(':', "%3A")
        } else {
            format!("sr%3Asport_event%3A{}", event_id)
        }
    }

    fn endpoint(&self, product: &str, event_id: &str, resource: &str) -> String {
        format!(
            "{}/{}/{}/v2/{}/sport_events/{}/{}",
            SPORTRADAR_BASE_URL,
            product,
            self.access_level,
            self.language,
            Self::event_urn(event_id),
            resource
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("x-api-key", self.api_key.as_str())
            .send()
            .await
            .context("Failed to reach Sportradar")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sportradar returned error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Sportradar response")
    }

    /// Raw prematch markets (moneyline, spread, total) for one event
    pub async fn fetch_prematch_markets(&self, event_id: &str) -> Result<Value> {
        info!("Fetching prematch odds for event {}", event_id);
        let url = self.endpoint(
            "oddscomparison-prematch",
            event_id,
            "sport_event_markets.json",
        );
        self.get_json(&url).await
    }

    /// Raw player props for one event
    pub async fn fetch_player_props(&self, event_id: &str) -> Result<Value> {
        info!("Fetching player props for event {}", event_id);
        let url = self.endpoint(
            "oddscomparison-player-props",
            event_id,
            "players_props.json",
        );
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client =
            SportradarClient::new("key".to_string(), "trial".to_string(), "en".to_string());

        let prematch = client.endpoint(
            "oddscomparison-prematch",
            "56328113",
            "sport_event_markets.json",
        );
        assert_eq!(
            prematch,
            "https://api.sportradar.com/oddscomparison-prematch/trial/v2/en/sport_events/\
             sr%3Asport_event%3A56328113/sport_event_markets.json"
        );

        let props = client.endpoint(
            "oddscomparison-player-props",
            "sr:sport_event:56930759",
            "players_props.json",
        );
        assert_eq!(
            props,
            "https://api.sportradar.com/oddscomparison-player-props/trial/v2/en/sport_events/\
             sr%3Asport_event%3A56930759/players_props.json"
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_player_props() {
        let config = Config::from_env();
        let client = SportradarClient::from_config(&config).unwrap();
        let raw = client.fetch_player_props("56930759").await.unwrap();
        assert!(raw.get("sport_event_players_props").is_some());
    }
}
