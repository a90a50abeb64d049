use interfaces_rapidapi_client::index::{RapidApiClient, RapidApiRequestError, RapidApiResult};
use thiserror::Error;

const API_PREFIX: &str = "/tennis/v2/atp";

pub async fn fetch_singles_ranking(
    client: &RapidApiClient,
) -> Result<RapidApiResult, FetchAtpError> {
    client
        .get(&format!("{API_PREFIX}/ranking/singles/"), &[])
        .await
        .map_err(|source| FetchAtpError::SinglesRanking { source })
}

pub async fn fetch_player_surface_summary(
    client: &RapidApiClient,
    player_id: &str,
) -> Result<RapidApiResult, FetchAtpError> {
    client
        .get(&format!("{API_PREFIX}/player/surface-summary/{player_id}"), &[])
        .await
        .map_err(|source| FetchAtpError::SurfaceSummary {
            player_id: player_id.to_string(),
            source,
        })
}

/// Full match history; the endpoint has no paging parameters.
pub async fn fetch_player_past_matches(
    client: &RapidApiClient,
    player_id: &str,
) -> Result<RapidApiResult, FetchAtpError> {
    client
        .get(&format!("{API_PREFIX}/player/past-matches/{player_id}"), &[])
        .await
        .map_err(|source| FetchAtpError::PastMatches {
            player_id: player_id.to_string(),
            source,
        })
}

pub async fn fetch_tournament_results(
    client: &RapidApiClient,
    tournament_id: &str,
) -> Result<RapidApiResult, FetchAtpError> {
    client
        .get(&format!("{API_PREFIX}/tournament/results/{tournament_id}"), &[])
        .await
        .map_err(|source| FetchAtpError::TournamentResults {
            tournament_id: tournament_id.to_string(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum FetchAtpError {
    #[error("SinglesRanking: {source}")]
    SinglesRanking {
        source: RapidApiRequestError,
    },

    #[error("SurfaceSummary({player_id}): {source}")]
    SurfaceSummary {
        player_id: String,
        source: RapidApiRequestError,
    },

    #[error("PastMatches({player_id}): {source}")]
    PastMatches {
        player_id: String,
        source: RapidApiRequestError,
    },

    #[error("TournamentResults({tournament_id}): {source}")]
    TournamentResults {
        tournament_id: String,
        source: RapidApiRequestError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Uri, Router};

    /// Answers every request with its own path and query.
    async fn spawn_echo() -> RapidApiClient {
        let app = Router::new().fallback(|uri: Uri| async move { uri.to_string() });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RapidApiClient::new("k", "tennis-api-atp-wta-itf.p.rapidapi.com")
            .unwrap()
            .with_base_url(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_endpoint_paths() {
        let client = spawn_echo().await;

        let ranking = fetch_singles_ranking(&client).await.unwrap();
        assert_eq!(ranking.body, "/tennis/v2/atp/ranking/singles/");

        let summary = fetch_player_surface_summary(&client, "47275").await.unwrap();
        assert_eq!(summary.body, "/tennis/v2/atp/player/surface-summary/47275");

        let matches = fetch_player_past_matches(&client, "47275").await.unwrap();
        assert_eq!(matches.body, "/tennis/v2/atp/player/past-matches/47275");

        let results = fetch_tournament_results(&client, "20340").await.unwrap();
        assert_eq!(results.body, "/tennis/v2/atp/tournament/results/20340");
    }

    #[tokio::test]
    async fn test_unreachable_host_names_the_player() {
        let client = RapidApiClient::new("k", "h").unwrap().with_base_url("http://127.0.0.1:1");
        let err = fetch_player_past_matches(&client, "47275").await.unwrap_err();
        assert!(matches!(err, FetchAtpError::PastMatches { ref player_id, .. } if player_id == "47275"));
    }
}
