//! Upstream feeds the pipelines read from.
//!
//! Each trait returns the decoded JSON body. `rapidapi` holds the real
//! implementations; tests swap in canned payloads.

pub mod rapidapi;

use async_trait::async_trait;
use interfaces_rapidapi_client::index::RapidApiResult;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request: {source}")]
    Request {
        source: anyhow::Error,
    },

    #[error("HttpStatus({status}): {body}")]
    HttpStatus {
        status: u16,
        body: String,
    },

    #[error("Decode: {source}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

impl SourceError {
    /// Whether a successful response arrived but could not be decoded. The
    /// odds request counters count these; error statuses are not counted.
    pub fn reached_api(&self) -> bool {
        matches!(self, SourceError::Decode { .. })
    }
}

pub fn decode_result(result: RapidApiResult) -> Result<Value, SourceError> {
    if !result.is_success() {
        return Err(SourceError::HttpStatus {
            status: result.status.as_u16(),
            body: result.body,
        });
    }

    serde_json::from_str(&result.body).map_err(|source| SourceError::Decode {
        source,
        body: result.body,
    })
}

/// Tournament, event and odds listings from the odds API.
#[async_trait]
pub trait OddsFeed: Send + Sync {
    async fn tournaments(&self, sport: &str) -> Result<Value, SourceError>;

    async fn events(&self, tournament_id: &str) -> Result<Value, SourceError>;

    async fn odds(&self, event_id: &str, bookmaker: &str) -> Result<Value, SourceError>;
}

/// Season-wide player statistics by category (`serve`, `aces`, ...).
#[async_trait]
pub trait StatsFeed: Send + Sync {
    async fn global_player_stats(&self, category: &str, year: &str) -> Result<Value, SourceError>;
}

/// ATP rankings, per-player history and tournament results.
#[async_trait]
pub trait AtpFeed: Send + Sync {
    async fn singles_ranking(&self) -> Result<Value, SourceError>;

    async fn surface_summary(&self, player_id: &str) -> Result<Value, SourceError>;

    async fn past_matches(&self, player_id: &str) -> Result<Value, SourceError>;

    async fn tournament_results(&self, tournament_id: &str) -> Result<Value, SourceError>;
}
