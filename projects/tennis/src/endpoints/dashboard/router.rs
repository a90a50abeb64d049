use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::pipelines::serve_stats::index::{load_serve_players, LoadServeStatsError};
use crate::sources::StatsFeed;
use crate::utils::chart::ChartConfig;
use crate::utils::leaderboard::{build_leaderboard, Leaderboard, ServeStat, DEFAULT_LEADERBOARD_SIZE};

use super::home::index::handler as home_handler;
use super::stat_chart::index::handler as stat_chart_handler;
use super::stat_options::index::handler as stat_options_handler;
use super::stat_table::index::handler as stat_table_handler;

/// Shared by every dashboard handler through an `Extension` layer.
#[derive(Clone)]
pub struct DashboardState {
    pub feed: Arc<dyn StatsFeed>,
    pub year: String,
    pub limit: usize,
    pub chart: ChartConfig,
}

impl DashboardState {
    pub fn new(feed: Arc<dyn StatsFeed>, year: impl Into<String>) -> Self {
        Self {
            feed,
            year: year.into(),
            limit: DEFAULT_LEADERBOARD_SIZE,
            chart: ChartConfig::default(),
        }
    }

    /// Fetches the season's serve table and ranks it by `stat`.
    pub async fn leaderboard(&self, stat: ServeStat) -> Result<Leaderboard, LoadServeStatsError> {
        let players = load_serve_players(self.feed.as_ref(), &self.year).await?;
        Ok(build_leaderboard(&players, stat, self.limit))
    }
}

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/stats", get(stat_options_handler))
        .route("/stats/{slug}", get(stat_table_handler))
        .route("/stats/{slug}/chart", get(stat_chart_handler))
        .layer(Extension(state))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sources::SourceError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    pub(crate) struct DashboardFeed {
        pub available: bool,
    }

    #[async_trait]
    impl StatsFeed for DashboardFeed {
        async fn global_player_stats(&self, _category: &str, _year: &str) -> Result<Value, SourceError> {
            if !self.available {
                return Err(SourceError::HttpStatus { status: 503, body: "down".into() });
            }
            Ok(json!({"data": [
                {"PlayerName": "Hubert Hurkacz", "AvgAcesPerMatchSortField": 13.1, "AvgDblFaultsPerMatchSortField": 2.4},
                {"PlayerName": "Taylor Fritz", "AvgAcesPerMatchSortField": 11.2, "AvgDblFaultsPerMatchSortField": 1.9},
                {"PlayerName": "Casper Ruud", "AvgAcesPerMatchSortField": 4.3, "AvgDblFaultsPerMatchSortField": 1.1}
            ]}))
        }
    }

    /// Serves the dashboard on a loopback port and returns its base URL.
    pub(crate) async fn spawn_dashboard(available: bool) -> String {
        let state = DashboardState::new(Arc::new(DashboardFeed { available }), "2024");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_leaderboard_uses_state_limit() {
        let mut state = DashboardState::new(Arc::new(DashboardFeed { available: true }), "2024");
        state.limit = 2;

        let board = state.leaderboard(ServeStat::AvgAces).await.unwrap();
        let names: Vec<_> = board.rows.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["Hubert Hurkacz", "Taylor Fritz"]);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let base = spawn_dashboard(true).await;
        let response = reqwest::get(format!("{base}/nope")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
