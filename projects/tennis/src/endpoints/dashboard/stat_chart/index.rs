use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::endpoints::dashboard::router::DashboardState;
use crate::pipelines::serve_stats::index::LoadServeStatsError;
use crate::utils::chart::generate_leaderboard_chart;
use crate::utils::leaderboard::{ServeStat, UnknownServeStatError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("UnknownStat: {source}")]
    UnknownStat {
        #[from]
        source: UnknownServeStatError,
    },
    #[error("LoadServeStats: {source}")]
    LoadServeStats {
        #[from]
        source: LoadServeStatsError,
    },
    #[error("ChartGeneration: {message}")]
    ChartGeneration {
        message: String,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::UnknownStat { source } => {
                (StatusCode::NOT_FOUND, format!("Unknown statistic: {}", source.stat)).into_response()
            }
            HandlerError::LoadServeStats { source } => {
                (StatusCode::BAD_GATEWAY, format!("Serve statistics unavailable: {source}")).into_response()
            }
            HandlerError::ChartGeneration { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Chart generation failed: {message}")).into_response()
            }
        }
    }
}

/// Axum handler: GET /stats/{slug}/chart
pub async fn handler(
    Extension(state): Extension<DashboardState>,
    Path(slug): Path<String>,
) -> Result<Response, HandlerError> {
    let stat: ServeStat = slug.parse()?;

    let leaderboard = state.leaderboard(stat).await.map_err(|source| {
        warn!("Chart {slug} unavailable: {source}");
        HandlerError::from(source)
    })?;

    let svg = generate_leaderboard_chart(&leaderboard, &state.chart)
        .map_err(|message| HandlerError::ChartGeneration { message })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::endpoints::dashboard::router::tests::spawn_dashboard;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_chart_without_values_is_placeholder_svg() {
        let base = spawn_dashboard(true).await;
        let response = reqwest::get(format!("{base}/stats/second-serve-points-won/chart")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        let body = response.text().await.unwrap();
        assert!(body.starts_with("<svg"));
        assert!(body.contains("No data available for: Second serve points won"));
    }

    #[tokio::test]
    async fn test_chart_draws_one_bar_per_player() {
        let base = spawn_dashboard(true).await;
        let response = reqwest::get(format!("{base}/stats/avg-aces/chart")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        let body = response.text().await.unwrap();
        assert!(body.contains("<rect"));
        assert!(body.contains("H. Hurkacz"));
        assert!(body.contains("T. Fritz"));
    }

    #[tokio::test]
    async fn test_chart_upstream_failure_is_bad_gateway() {
        let base = spawn_dashboard(false).await;
        let response = reqwest::get(format!("{base}/stats/first-serve/chart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_chart_unknown_slug_is_not_found() {
        let base = spawn_dashboard(true).await;
        let response = reqwest::get(format!("{base}/stats/volleys/chart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
