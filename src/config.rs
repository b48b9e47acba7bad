//! Runtime configuration for the provider clients.
//!
//! Everything is read once from the environment (after loading `.env`) into
//! a [`Config`] value that is handed to the clients that need it. The
//! analysis functions never look at configuration.

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_SPORTRADAR_ACCESS_LEVEL: &str = "trial";
const DEFAULT_SPORTRADAR_LANGUAGE: &str = "en";
const DEFAULT_ODDS_API_REGIONS: &str = "us";
const DEFAULT_CACHE_DIR: &str = "cache";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub odds_api_key: Option<String>,
    pub odds_api_regions: String,
    pub sportradar_api_key: Option<String>,
    pub sportradar_access_level: String,
    pub sportradar_language: String,
    pub cache_dir: PathBuf,
    /// Player-prop market keywords; empty means the built-in list
    pub prop_markets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odds_api_key: None,
            odds_api_regions: DEFAULT_ODDS_API_REGIONS.to_string(),
            sportradar_api_key: None,
            sportradar_access_level: DEFAULT_SPORTRADAR_ACCESS_LEVEL.to_string(),
            sportradar_language: DEFAULT_SPORTRADAR_LANGUAGE.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            prop_markets: Vec::new(),
        }
    }
}

impl Config {
    /// Load `.env` and read configuration from the environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        Self {
            odds_api_key: get("ODDS_API_KEY"),
            odds_api_regions: get("ODDS_API_REGIONS").unwrap_or(defaults.odds_api_regions),
            sportradar_api_key: get("SPORTRADAR_API_KEY"),
            sportradar_access_level: get("SPORTRADAR_ACCESS_LEVEL")
                .unwrap_or(defaults.sportradar_access_level),
            sportradar_language: get("SPORTRADAR_LANGUAGE").unwrap_or(defaults.sportradar_language),
            cache_dir: get("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            prop_markets: get("PROP_MARKETS")
                .map(|list| {
                    list.split(',')
                        .map(|m| m.trim().to_lowercase())
                        .filter(|m| !m.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn require_odds_api_key(&self) -> Result<&str> {
        self.odds_api_key
            .as_deref()
            .context("ODDS_API_KEY not set in environment or .env file")
    }

    pub fn require_sportradar_api_key(&self) -> Result<&str> {
        self.sportradar_api_key
            .as_deref()
            .context("SPORTRADAR_API_KEY not set in environment or .env file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert!(config.require_sportradar_api_key().is_err());
        assert!(config.require_odds_api_key().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SPORTRADAR_API_KEY", " sr-key "),
            ("SPORTRADAR_ACCESS_LEVEL", "production"),
            ("ODDS_API_KEY", ""),
            ("CACHE_DIR", "/tmp/odds"),
            ("PROP_MARKETS", "Total Points, total rebounds,,"),
        ]);
        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.require_sportradar_api_key().unwrap(), "sr-key");
        assert_eq!(config.sportradar_access_level, "production");
        assert_eq!(config.sportradar_language, "en");
        assert_eq!(config.odds_api_key, None);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/odds"));
        assert_eq!(config.prop_markets, vec!["total points", "total rebounds"]);
    }
}
