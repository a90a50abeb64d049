use interfaces_rapidapi_client::index::{RapidApiClient, RapidApiRequestError, RapidApiResult};
use thiserror::Error;

/// Path segments accepted by `/global_players_stats/{category}/{year}/all`.
pub const SERVE: &str = "serve";
pub const ACES: &str = "aces";
pub const FIRST_SERVE: &str = "1stserve";
pub const BREAK_POINTS_CONVERTED: &str = "breakpointsconverted";
pub const SERVICE_GAMES_WON: &str = "servicegameswon";

pub async fn fetch_global_player_stats(
    client: &RapidApiClient,
    category: &str,
    year: &str,
) -> Result<RapidApiResult, FetchGlobalPlayerStatsError> {
    let path = format!("/global_players_stats/{category}/{year}/all");

    client
        .get(&path, &[])
        .await
        .map_err(|source| FetchGlobalPlayerStatsError::RequestSend {
            category: category.to_string(),
            year: year.to_string(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum FetchGlobalPlayerStatsError {
    #[error("GlobalPlayerStats({category}/{year}): {source}")]
    RequestSend {
        category: String,
        year: String,
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
        RapidApiClient::new("k", "ultimate-tennis1.p.rapidapi.com")
            .unwrap()
            .with_base_url(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_global_player_stats_path() {
        let client = spawn_echo().await;

        let serve = fetch_global_player_stats(&client, SERVE, "2024").await.unwrap();
        assert_eq!(serve.body, "/global_players_stats/serve/2024/all");

        let first_serve = fetch_global_player_stats(&client, FIRST_SERVE, "2023").await.unwrap();
        assert_eq!(first_serve.body, "/global_players_stats/1stserve/2023/all");
    }

    #[tokio::test]
    async fn test_unreachable_host_names_category_and_year() {
        let client = RapidApiClient::new("k", "h").unwrap().with_base_url("http://127.0.0.1:1");
        let err = fetch_global_player_stats(&client, ACES, "2024").await.unwrap_err();
        assert_eq!(err.to_string().split(':').next(), Some("GlobalPlayerStats(aces/2024)"));
    }
}
