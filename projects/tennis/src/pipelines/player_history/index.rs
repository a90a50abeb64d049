use std::time::Duration;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::models::player_history::PlayerHistoryRecord;
use crate::sources::{AtpFeed, SourceError};
use crate::utils::failure_streak::{FailureStreak, DEFAULT_FAILURE_LIMIT};
use crate::utils::json::is_truthy;

/// Surface summary and past matches for one player. An endpoint that failed
/// or answered with an empty payload is `None`; only errors and `null`
/// bodies set the matching `*_failed` flag.
#[derive(Debug, Clone, Default)]
pub struct PlayerHistory {
    pub surface_summary: Option<Value>,
    pub past_matches: Option<Value>,
    pub surface_summary_failed: bool,
    pub past_matches_failed: bool,
}

impl PlayerHistory {
    pub fn is_empty(&self) -> bool {
        self.surface_summary.is_none() && self.past_matches.is_none()
    }

    /// Both requests failed. This is what counts towards the failure streak.
    pub fn all_failed(&self) -> bool {
        self.surface_summary_failed && self.past_matches_failed
    }
}

/// A player queued for history collection. `info` is stored verbatim as the
/// record's `player_info`.
#[derive(Debug, Clone)]
pub struct HistoryCandidate<I> {
    pub key: String,
    pub id: String,
    pub name: String,
    pub info: I,
}

#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub failure_limit: u32,
    pub player_delay: Duration,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            failure_limit: DEFAULT_FAILURE_LIMIT,
            player_delay: Duration::from_secs(1),
        }
    }
}

/// Collected records in collection order. Serializes as a JSON object keyed
/// by record key.
#[derive(Debug, Clone)]
pub struct HistoryRecords<I>(Vec<(String, PlayerHistoryRecord<I>)>);

impl<I> HistoryRecords<I> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or replaces the record stored under `key`, keeping the
    /// earlier position on replace.
    pub fn insert(&mut self, key: String, record: PlayerHistoryRecord<I>) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = record,
            None => self.0.push((key, record)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PlayerHistoryRecord<I>> {
        self.0.iter().find(|(existing, _)| existing == key).map(|(_, record)| record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<I> Default for HistoryRecords<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Serialize> Serialize for HistoryRecords<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, record) in &self.0 {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

#[derive(Debug)]
pub struct CollectionOutcome<I> {
    pub records: HistoryRecords<I>,
    pub processed: usize,
    pub succeeded: usize,
    pub aborted: bool,
}

impl<I> CollectionOutcome<I> {
    pub fn failed(&self) -> usize {
        self.processed - self.succeeded
    }
}

/// Local wall-clock timestamp stored in each record.
pub fn collected_at_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Number of matches in a past-matches payload: `data.matches` or a `data`
/// list.
pub fn count_past_matches(past_matches: &Value) -> usize {
    match past_matches.get("data") {
        Some(Value::Object(data)) => data.get("matches").and_then(Value::as_array).map_or(0, Vec::len),
        Some(Value::Array(matches)) => matches.len(),
        _ => 0,
    }
}

pub async fn fetch_player_history(feed: &dyn AtpFeed, player_id: &str) -> PlayerHistory {
    let (surface_summary, surface_summary_failed) =
        payload_or_failure(feed.surface_summary(player_id).await, "Surface summary", player_id);
    let (past_matches, past_matches_failed) =
        payload_or_failure(feed.past_matches(player_id).await, "Past matches", player_id);

    PlayerHistory {
        surface_summary,
        past_matches,
        surface_summary_failed,
        past_matches_failed,
    }
}

/// Splits a response into the payload worth keeping and whether the request
/// failed. An empty body answered the request; a `null` one did not.
fn payload_or_failure(
    result: Result<Value, SourceError>,
    endpoint: &str,
    player_id: &str,
) -> (Option<Value>, bool) {
    match result {
        Ok(Value::Null) => {
            warn!("{endpoint} request for player {player_id} returned no body");
            (None, true)
        }
        Ok(payload) if is_truthy(&payload) => (Some(payload), false),
        Ok(_) => (None, false),
        Err(err) => {
            warn!("{endpoint} request failed for player {player_id}: {err}");
            (None, true)
        }
    }
}

/// Fetches the history of every candidate in order. A player whose two
/// requests both failed counts as a failure and is not stored; the run stops
/// once `failure_limit` failures happen in a row. Every stored player is
/// followed by `player_delay`.
pub async fn collect_histories<I>(
    feed: &dyn AtpFeed,
    candidates: Vec<HistoryCandidate<I>>,
    options: &CollectionOptions,
) -> CollectionOutcome<I> {
    let mut streak = FailureStreak::new(options.failure_limit);
    let mut outcome = CollectionOutcome {
        records: HistoryRecords::new(),
        processed: 0,
        succeeded: 0,
        aborted: false,
    };

    let total = candidates.len();
    info!("Collecting history for {total} players");

    for (idx, candidate) in candidates.into_iter().enumerate() {
        info!("Collecting {} (id {}) [{}/{}]", candidate.name, candidate.id, idx + 1, total);
        outcome.processed += 1;

        let collected_at = collected_at_now();
        let history = fetch_player_history(feed, &candidate.id).await;

        match &history.surface_summary {
            Some(_) => info!("Surface summary collected"),
            None => warn!("Surface summary unavailable for {}", candidate.name),
        }
        match &history.past_matches {
            Some(matches) => info!("Past matches collected ({} matches)", count_past_matches(matches)),
            None => warn!("Past matches unavailable for {}", candidate.name),
        }

        if history.all_failed() {
            let limit_reached = streak.record_failure();
            warn!("Consecutive failure #{} for {}", streak.current(), candidate.name);
            if limit_reached {
                error!(
                    "{} consecutive failures, stopping collection. Last failed player: {} (id {})",
                    streak.current(),
                    candidate.name,
                    candidate.id
                );
                outcome.aborted = true;
                break;
            }
            continue;
        }

        streak.record_success();
        outcome.succeeded += 1;
        outcome.records.insert(
            candidate.key,
            PlayerHistoryRecord {
                player_info: candidate.info,
                collected_at,
                surface_summary: history.surface_summary,
                past_matches: history.past_matches,
            },
        );

        tokio::time::sleep(options.player_delay).await;
    }

    info!(
        "Collection finished: {} processed, {} succeeded, {} failed",
        outcome.processed,
        outcome.succeeded,
        outcome.failed()
    );
    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;

    /// Serves history for `known` players. `blank` players get a 404 summary
    /// and an empty past-matches body; every other lookup fails outright
    /// (a 404 summary and a `null` past-matches body).
    pub(crate) struct FakeAtp {
        pub ranking: Value,
        pub tournament: Value,
        pub known: HashSet<String>,
        pub blank: HashSet<String>,
    }

    impl FakeAtp {
        pub fn with_known(known: &[&str]) -> Self {
            Self {
                ranking: Value::Null,
                tournament: Value::Null,
                known: known.iter().map(|id| id.to_string()).collect(),
                blank: HashSet::new(),
            }
        }
    }

    #[async_trait]
    impl AtpFeed for FakeAtp {
        async fn singles_ranking(&self) -> Result<Value, SourceError> {
            Ok(self.ranking.clone())
        }

        async fn surface_summary(&self, player_id: &str) -> Result<Value, SourceError> {
            if self.known.contains(player_id) {
                Ok(json!({"data": [{"year": 2024, "hard": {"w": 10}}]}))
            } else {
                Err(SourceError::HttpStatus { status: 404, body: String::new() })
            }
        }

        async fn past_matches(&self, player_id: &str) -> Result<Value, SourceError> {
            if self.known.contains(player_id) {
                Ok(json!({"data": {"matches": [{"id": 1}, {"id": 2}]}}))
            } else if self.blank.contains(player_id) {
                Ok(json!({}))
            } else {
                Ok(Value::Null)
            }
        }

        async fn tournament_results(&self, _tournament_id: &str) -> Result<Value, SourceError> {
            Ok(self.tournament.clone())
        }
    }

    fn candidate(id: &str) -> HistoryCandidate<Value> {
        HistoryCandidate {
            key: format!("Player {id}_{id}"),
            id: id.to_string(),
            name: format!("Player {id}"),
            info: json!({"id": id}),
        }
    }

    fn options() -> CollectionOptions {
        CollectionOptions { player_delay: Duration::ZERO, ..Default::default() }
    }

    #[test]
    fn test_count_past_matches() {
        assert_eq!(count_past_matches(&json!({"data": {"matches": [1, 2, 3]}})), 3);
        assert_eq!(count_past_matches(&json!({"data": [1, 2]})), 2);
        assert_eq!(count_past_matches(&json!({"data": {"other": []}})), 0);
        assert_eq!(count_past_matches(&json!([1])), 0);
    }

    #[test]
    fn test_collected_at_format() {
        let stamp = collected_at_now();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[tokio::test]
    async fn test_empty_payload_is_missing_but_answered() {
        let mut feed = FakeAtp::with_known(&[]);
        feed.blank.insert("1".to_string());

        let history = fetch_player_history(&feed, "1").await;
        assert!(history.is_empty());
        assert!(history.surface_summary_failed);
        assert!(!history.past_matches_failed);
        assert!(!history.all_failed());

        let history = fetch_player_history(&feed, "2").await;
        assert!(history.all_failed());
    }

    #[tokio::test]
    async fn test_players_with_an_empty_answer_are_stored_without_streak() {
        let ids = ["b0", "b1", "b2", "b3", "b4", "b5"];
        let mut feed = FakeAtp::with_known(&[]);
        feed.blank = ids.iter().map(|id| id.to_string()).collect();

        let outcome = collect_histories(&feed, ids.iter().map(|id| candidate(id)).collect(), &options()).await;

        assert!(!outcome.aborted);
        assert_eq!(outcome.processed, 6);
        assert_eq!(outcome.succeeded, 6);
        assert_eq!(outcome.records.len(), 6);

        let json = serde_json::to_value(&outcome.records).unwrap();
        assert!(json["Player b5_b5"]["surface_summary"].is_null());
        assert!(json["Player b5_b5"]["past_matches"].is_null());
    }

    #[tokio::test]
    async fn test_collect_skips_failures_and_keeps_order() {
        let feed = FakeAtp::with_known(&["3", "1"]);
        let outcome = collect_histories(&feed, vec![candidate("3"), candidate("2"), candidate("1")], &options()).await;

        assert!(!outcome.aborted);
        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.records.keys().collect::<Vec<_>>(), ["Player 3_3", "Player 1_1"]);

        let json = serde_json::to_value(&outcome.records).unwrap();
        assert_eq!(json["Player 3_3"]["player_info"]["id"], "3");
        assert_eq!(json["Player 1_1"]["past_matches"]["data"]["matches"][1]["id"], 2);
    }

    #[tokio::test]
    async fn test_delay_follows_stored_players_only() {
        let feed = FakeAtp::with_known(&["ok"]);
        let options = CollectionOptions { player_delay: Duration::from_millis(300), ..Default::default() };
        let started = std::time::Instant::now();

        let outcome = collect_histories(&feed, vec![candidate("x0"), candidate("ok"), candidate("x1")], &options).await;

        let elapsed = started.elapsed();
        assert_eq!(outcome.succeeded, 1);
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_collect_aborts_after_consecutive_failures() {
        let feed = FakeAtp::with_known(&["ok"]);
        let mut candidates: Vec<_> = (0..4).map(|i| candidate(&format!("x{i}"))).collect();
        candidates.push(candidate("ok"));
        candidates.extend((4..9).map(|i| candidate(&format!("x{i}"))));
        candidates.push(candidate("never"));

        let outcome = collect_histories(&feed, candidates, &options()).await;

        // four failures, one success resets, then five more abort the run
        assert!(outcome.aborted);
        assert_eq!(outcome.processed, 10);
        assert_eq!(outcome.succeeded, 1);
        assert!(outcome.records.get("Player ok_ok").is_some());
    }
}
