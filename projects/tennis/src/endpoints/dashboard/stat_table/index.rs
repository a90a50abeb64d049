use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;

use crate::endpoints::dashboard::router::DashboardState;
use crate::pipelines::serve_stats::index::LoadServeStatsError;
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
        }
    }
}

/// Axum handler: GET /stats/{slug}
pub async fn handler(
    Extension(state): Extension<DashboardState>,
    Path(slug): Path<String>,
) -> Result<Response, HandlerError> {
    let stat: ServeStat = slug.parse()?;

    let leaderboard = state.leaderboard(stat).await.map_err(|source| {
        warn!("Leaderboard {slug} unavailable: {source}");
        HandlerError::from(source)
    })?;

    Ok(Json(leaderboard).into_response())
}
