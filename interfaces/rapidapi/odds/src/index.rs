use interfaces_rapidapi_client::index::{RapidApiClient, RapidApiRequestError, RapidApiResult};
use thiserror::Error;

pub async fn fetch_tournaments(
    client: &RapidApiClient,
    sport: &str,
) -> Result<RapidApiResult, FetchOddsApiError> {
    client
        .get("/tournaments", &[("sport", sport)])
        .await
        .map_err(|source| FetchOddsApiError::Tournaments { source })
}

pub async fn fetch_events(
    client: &RapidApiClient,
    tournament_id: &str,
    media: bool,
) -> Result<RapidApiResult, FetchOddsApiError> {
    let media = if media { "true" } else { "false" };

    client
        .get("/events", &[("tournamentId", tournament_id), ("media", media)])
        .await
        .map_err(|source| FetchOddsApiError::Events {
            tournament_id: tournament_id.to_string(),
            source,
        })
}

/// Odds for one event, restricted to `bookmakers` (comma separated).
pub async fn fetch_odds(
    client: &RapidApiClient,
    event_id: &str,
    bookmakers: &str,
    odds_format: &str,
    raw: bool,
) -> Result<RapidApiResult, FetchOddsApiError> {
    let raw = if raw { "true" } else { "false" };

    client
        .get(
            "/odds",
            &[
                ("eventId", event_id),
                ("bookmakers", bookmakers),
                ("oddsFormat", odds_format),
                ("raw", raw),
            ],
        )
        .await
        .map_err(|source| FetchOddsApiError::Odds {
            event_id: event_id.to_string(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum FetchOddsApiError {
    #[error("Tournaments: {source}")]
    Tournaments {
        source: RapidApiRequestError,
    },

    #[error("Events({tournament_id}): {source}")]
    Events {
        tournament_id: String,
        source: RapidApiRequestError,
    },

    #[error("Odds({event_id}): {source}")]
    Odds {
        event_id: String,
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
        RapidApiClient::new("k", "odds.p.rapidapi.com")
            .unwrap()
            .with_base_url(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_fetch_tournaments_query() {
        let client = spawn_echo().await;
        let result = fetch_tournaments(&client, "tennis").await.unwrap();
        assert_eq!(result.body, "/tournaments?sport=tennis");
    }

    #[tokio::test]
    async fn test_fetch_events_query() {
        let client = spawn_echo().await;
        let result = fetch_events(&client, "2587", false).await.unwrap();
        assert_eq!(result.body, "/events?tournamentId=2587&media=false");
    }

    #[tokio::test]
    async fn test_fetch_odds_query() {
        let client = spawn_echo().await;
        let result = fetch_odds(&client, "1015942", "bet365", "decimal", true).await.unwrap();
        assert_eq!(
            result.body,
            "/odds?eventId=1015942&bookmakers=bet365&oddsFormat=decimal&raw=true"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_names_the_event() {
        let client = RapidApiClient::new("k", "h").unwrap().with_base_url("http://127.0.0.1:1");
        let err = fetch_odds(&client, "42", "bet365", "decimal", false).await.unwrap_err();
        assert!(matches!(err, FetchOddsApiError::Odds { ref event_id, .. } if event_id == "42"));
    }
}
