use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::player_history::RankedPlayerInfo;
use crate::pipelines::player_history::index::{
    collect_histories, CollectionOptions, CollectionOutcome, HistoryCandidate,
};
use crate::sources::{AtpFeed, SourceError};
use crate::utils::json::{is_truthy, lenient_string};

pub const OUTPUT_FILE: &str = "stats2_raw.json";
pub const DEFAULT_TOP_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum CollectTopPlayersError {
    #[error("RankingRequest: {source}")]
    RankingRequest {
        #[from]
        source: SourceError,
    },

    #[error("RankingEmpty")]
    RankingEmpty,
}

/// First `limit` entries of the ranking's `data` list.
pub fn top_ranked_entries(ranking: &Value, limit: usize) -> Vec<Value> {
    ranking
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().take(limit).cloned().collect())
        .unwrap_or_default()
}

/// Turns a ranking entry into a collection candidate keyed `"{name}_{id}"`.
/// Entries without a player id or name yield `None`.
pub fn ranked_candidate(entry: Value) -> Option<HistoryCandidate<RankedPlayerInfo>> {
    let player = entry.get("player")?;
    let id = player.get("id").filter(|id| is_truthy(id))?.clone();
    let id_text = lenient_string(&id)?;
    let name = player.get("name").and_then(Value::as_str).filter(|n| !n.is_empty())?.to_string();

    Some(HistoryCandidate {
        key: format!("{name}_{id_text}"),
        id: id_text,
        name: name.clone(),
        info: RankedPlayerInfo { id, name, ranking_data: entry },
    })
}

/// Ranks the top `limit` singles players and collects their surface summary
/// and match history.
pub async fn collect_top_players(
    feed: &dyn AtpFeed,
    limit: usize,
    options: &CollectionOptions,
) -> Result<CollectionOutcome<RankedPlayerInfo>, CollectTopPlayersError> {
    info!("Fetching the top {limit} of the ATP singles ranking");
    let ranking = feed.singles_ranking().await?;

    let entries = top_ranked_entries(&ranking, limit);
    if entries.is_empty() {
        return Err(CollectTopPlayersError::RankingEmpty);
    }
    info!("{} ranking entries fetched", entries.len());

    let candidates = entries
        .into_iter()
        .filter_map(|entry| {
            let summary = entry.to_string();
            let candidate = ranked_candidate(entry);
            if candidate.is_none() {
                warn!("Incomplete ranking entry, skipping: {summary}");
            }
            candidate
        })
        .collect();

    Ok(collect_histories(feed, candidates, options).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::player_history::index::tests::FakeAtp;
    use serde_json::json;
    use std::time::Duration;

    fn options() -> CollectionOptions {
        CollectionOptions { player_delay: Duration::ZERO, ..Default::default() }
    }

    #[test]
    fn test_top_ranked_entries_limits_and_tolerates_missing_data() {
        let ranking = json!({"data": [1, 2, 3]});
        assert_eq!(top_ranked_entries(&ranking, 2), vec![json!(1), json!(2)]);
        assert!(top_ranked_entries(&json!({"message": "quota"}), 50).is_empty());
    }

    #[test]
    fn test_ranked_candidate_requires_id_and_name() {
        let candidate = ranked_candidate(json!({"position": 1, "player": {"id": 47275, "name": "Jannik Sinner"}})).unwrap();
        assert_eq!(candidate.key, "Jannik Sinner_47275");
        assert_eq!(candidate.id, "47275");
        assert_eq!(candidate.info.ranking_data["position"], 1);

        assert!(ranked_candidate(json!({"player": {"id": 1}})).is_none());
        assert!(ranked_candidate(json!({"player": {"id": 0, "name": "Zero"}})).is_none());
        assert!(ranked_candidate(json!({"position": 3})).is_none());
    }

    #[tokio::test]
    async fn test_collect_top_players() {
        let mut feed = FakeAtp::with_known(&["10", "20"]);
        feed.ranking = json!({"data": [
            {"position": 1, "player": {"id": 10, "name": "First Player"}},
            {"position": 2, "player": {"name": "No Id"}},
            {"position": 3, "player": {"id": 20, "name": "Third Player"}},
            {"position": 4, "player": {"id": 40, "name": "Out Of Range"}}
        ]});

        let outcome = collect_top_players(&feed, 3, &options()).await.unwrap();

        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.records.keys().collect::<Vec<_>>(), ["First Player_10", "Third Player_20"]);

        let json = serde_json::to_value(&outcome.records).unwrap();
        assert_eq!(json["Third Player_20"]["player_info"]["ranking_data"]["position"], 3);
        assert_eq!(json["Third Player_20"]["player_info"]["id"], 20);
    }

    #[tokio::test]
    async fn test_empty_ranking_is_an_error() {
        let mut feed = FakeAtp::with_known(&[]);
        feed.ranking = json!({"data": []});
        let err = collect_top_players(&feed, 50, &options()).await.unwrap_err();
        assert!(matches!(err, CollectTopPlayersError::RankingEmpty));
    }
}
