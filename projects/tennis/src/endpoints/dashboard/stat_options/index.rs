use axum::Json;
use serde::Serialize;

use crate::utils::leaderboard::ServeStat;

#[derive(Debug, Serialize)]
pub struct StatOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Axum handler: GET /stats
pub async fn handler() -> Json<Vec<StatOption>> {
    Json(
        ServeStat::ALL
            .into_iter()
            .map(|stat| StatOption {
                slug: stat.slug(),
                label: stat.label(),
                description: stat.description(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::endpoints::dashboard::router::tests::spawn_dashboard;
    use serde_json::Value;

    #[tokio::test]
    async fn test_lists_every_stat() {
        let base = spawn_dashboard(false).await;
        let options: Value = reqwest::get(format!("{base}/stats")).await.unwrap().json().await.unwrap();

        let options = options.as_array().unwrap();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0]["slug"], "avg-aces");
        assert_eq!(options[3]["label"], "Average double faults per match");
    }
}
