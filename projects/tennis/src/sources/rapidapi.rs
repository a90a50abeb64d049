use async_trait::async_trait;
use interfaces_rapidapi_client::index::RapidApiClient;
use interfaces_rapidapi_odds::index::{fetch_events, fetch_odds, fetch_tournaments};
use interfaces_rapidapi_tennis_atp::index::{
    fetch_player_past_matches, fetch_player_surface_summary, fetch_singles_ranking,
    fetch_tournament_results,
};
use interfaces_rapidapi_ultimate_tennis::index::fetch_global_player_stats;
use serde_json::Value;

use super::{decode_result, AtpFeed, OddsFeed, SourceError, StatsFeed};

const ODDS_FORMAT: &str = "decimal";

fn request_error<E>(source: E) -> SourceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SourceError::Request { source: anyhow::Error::new(source) }
}

pub struct RapidApiOdds {
    client: RapidApiClient,
}

impl RapidApiOdds {
    pub fn new(client: RapidApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OddsFeed for RapidApiOdds {
    async fn tournaments(&self, sport: &str) -> Result<Value, SourceError> {
        let result = fetch_tournaments(&self.client, sport).await.map_err(request_error)?;
        decode_result(result)
    }

    async fn events(&self, tournament_id: &str) -> Result<Value, SourceError> {
        let result = fetch_events(&self.client, tournament_id, false)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }

    async fn odds(&self, event_id: &str, bookmaker: &str) -> Result<Value, SourceError> {
        let result = fetch_odds(&self.client, event_id, bookmaker, ODDS_FORMAT, false)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }
}

pub struct RapidApiStats {
    client: RapidApiClient,
}

impl RapidApiStats {
    pub fn new(client: RapidApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatsFeed for RapidApiStats {
    async fn global_player_stats(&self, category: &str, year: &str) -> Result<Value, SourceError> {
        let result = fetch_global_player_stats(&self.client, category, year)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }
}

pub struct RapidApiAtp {
    client: RapidApiClient,
}

impl RapidApiAtp {
    pub fn new(client: RapidApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AtpFeed for RapidApiAtp {
    async fn singles_ranking(&self) -> Result<Value, SourceError> {
        let result = fetch_singles_ranking(&self.client).await.map_err(request_error)?;
        decode_result(result)
    }

    async fn surface_summary(&self, player_id: &str) -> Result<Value, SourceError> {
        let result = fetch_player_surface_summary(&self.client, player_id)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }

    async fn past_matches(&self, player_id: &str) -> Result<Value, SourceError> {
        let result = fetch_player_past_matches(&self.client, player_id)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }

    async fn tournament_results(&self, tournament_id: &str) -> Result<Value, SourceError> {
        let result = fetch_tournament_results(&self.client, tournament_id)
            .await
            .map_err(request_error)?;
        decode_result(result)
    }
}
