use std::path::PathBuf;

use interfaces_rapidapi_client::index::{RapidApiClient, RapidApiRequestError};
use thiserror::Error;

pub const DEFAULT_STATS_HOST: &str = "ultimate-tennis1.p.rapidapi.com";
pub const DEFAULT_ATP_HOST: &str = "tennis-api-atp-wta-itf.p.rapidapi.com";
pub const DEFAULT_DATA_DIR: &str = "dados";

/// Credentials and paths, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rapidapi_key: Option<String>,
    pub odds_host: Option<String>,
    pub stats_key: Option<String>,
    pub stats_host: String,
    pub atp_host: String,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let rapidapi_key = var("RAPIDAPI_KEY");

        Self {
            stats_key: var("STATS_RAPIDAPI_KEY").or_else(|| rapidapi_key.clone()),
            rapidapi_key,
            odds_host: var("RAPIDAPI_HOST"),
            stats_host: var("STATS_RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_STATS_HOST.to_string()),
            atp_host: var("TENNIS_API_HOST").unwrap_or_else(|| DEFAULT_ATP_HOST.to_string()),
            data_dir: var("TENNIS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    pub fn raw_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join("raw").join(file_name)
    }

    pub fn clean_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join("clean").join(file_name)
    }

    pub fn odds_client(&self) -> Result<RapidApiClient, ConfigError> {
        let key = require(&self.rapidapi_key, "RAPIDAPI_KEY")?;
        let host = require(&self.odds_host, "RAPIDAPI_HOST")?;
        RapidApiClient::new(key, host).map_err(|source| ConfigError::BuildClient { source })
    }

    pub fn stats_client(&self) -> Result<RapidApiClient, ConfigError> {
        let key = require(&self.stats_key, "STATS_RAPIDAPI_KEY")?;
        RapidApiClient::new(key, &self.stats_host)
            .map_err(|source| ConfigError::BuildClient { source })
    }

    pub fn atp_client(&self) -> Result<RapidApiClient, ConfigError> {
        let key = require(&self.rapidapi_key, "RAPIDAPI_KEY")?;
        RapidApiClient::new(key, &self.atp_host)
            .map_err(|source| ConfigError::BuildClient { source })
    }
}

fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::MissingVar { name })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MissingVar: {name} is not set")]
    MissingVar {
        name: &'static str,
    },

    #[error("BuildClient: {source}")]
    BuildClient {
        source: RapidApiRequestError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.stats_host, DEFAULT_STATS_HOST);
        assert_eq!(config.atp_host, DEFAULT_ATP_HOST);
        assert_eq!(config.raw_path("stats2_raw.json"), PathBuf::from("dados/raw/stats2_raw.json"));
        assert!(matches!(config.odds_client(), Err(ConfigError::MissingVar { name: "RAPIDAPI_KEY" })));
    }

    #[test]
    fn test_stats_key_falls_back_to_shared_key() {
        let config = config(&[("RAPIDAPI_KEY", "shared"), ("STATS_RAPIDAPI_KEY", " ")]);
        assert_eq!(config.stats_key.as_deref(), Some("shared"));
        assert_eq!(config.stats_client().unwrap().host(), DEFAULT_STATS_HOST);
    }

    #[test]
    fn test_odds_client_requires_host() {
        let config = config(&[("RAPIDAPI_KEY", "k")]);
        assert!(matches!(config.odds_client(), Err(ConfigError::MissingVar { name: "RAPIDAPI_HOST" })));

        let config = AppConfig { odds_host: Some("odds.p.rapidapi.com".into()), ..config };
        assert_eq!(config.odds_client().unwrap().base_url(), "https://odds.p.rapidapi.com");
    }
}
