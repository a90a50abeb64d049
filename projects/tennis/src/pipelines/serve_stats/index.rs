use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::serve_stats::{rename_feed_fields, PlayerServeStats};
use crate::sources::{SourceError, StatsFeed};
use crate::utils::json::lenient_string;
use crate::utils::names::normalize_player_name;

pub const SERVE_CATEGORY: &str = "serve";

/// Keys an object-shaped response may hold the player list under, in the
/// order they are tried.
const PLAYER_LIST_KEYS: [&str; 6] = ["data", "results", "players", "items", "statistics", "response"];

/// Serve stats keyed by normalised player name, as renamed feed fields.
pub type ServeStatsMap = BTreeMap<String, Map<String, Value>>;

#[derive(Debug, Error)]
pub enum LoadServeStatsError {
    #[error("ServeStatsRequest: {source}")]
    Request {
        #[from]
        source: SourceError,
    },

    #[error("PlayerListMissing: {message}")]
    PlayerListMissing {
        message: String,
    },
}

/// The player list inside a serve-stats payload, if there is one.
pub fn extract_player_list(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => PLAYER_LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    }
}

/// Fetches the serve table for `year` and returns its object items.
pub async fn load_serve_items(
    feed: &dyn StatsFeed,
    year: &str,
) -> Result<Vec<Map<String, Value>>, LoadServeStatsError> {
    let payload = feed.global_player_stats(SERVE_CATEGORY, year).await?;

    let Some(items) = extract_player_list(&payload) else {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("unexpected payload shape: {}", shape_of(&payload)));
        return Err(LoadServeStatsError::PlayerListMissing { message });
    };

    Ok(items.iter().filter_map(Value::as_object).cloned().collect())
}

/// Fetches and parses the serve table for `year`. Non-object items and items
/// that fail to parse are skipped.
pub async fn load_serve_players(
    feed: &dyn StatsFeed,
    year: &str,
) -> Result<Vec<PlayerServeStats>, LoadServeStatsError> {
    Ok(load_serve_items(feed, year)
        .await?
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<PlayerServeStats>(Value::Object(item)) {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!("skipping unparseable serve stats item: {err}");
                None
            }
        })
        .collect())
}

/// Indexes feed items by normalised `PlayerName`; later duplicates win and
/// items without a usable name are dropped.
pub fn index_by_name(items: Vec<Map<String, Value>>) -> ServeStatsMap {
    let mut map = ServeStatsMap::new();
    for item in items {
        let key = item
            .get("PlayerName")
            .and_then(lenient_string)
            .map(|name| normalize_player_name(&name))
            .unwrap_or_default();
        if !key.is_empty() {
            map.insert(key, rename_feed_fields(&item));
        }
    }
    map
}

/// Serve stats for every player of `year` plus the number of requests that
/// reached the API. Failures are logged and yield an empty map.
pub async fn get_all_player_stats(feed: &dyn StatsFeed, year: &str) -> (ServeStatsMap, u32) {
    info!("Fetching player serve statistics for {year}");

    match load_serve_items(feed, year).await {
        Ok(items) => {
            let map = index_by_name(items);
            if map.is_empty() {
                warn!("No usable player found in the serve statistics response");
            } else {
                info!("Serve statistics mapped for {} players", map.len());
            }
            (map, 1)
        }
        Err(LoadServeStatsError::Request { source }) => {
            warn!("Failed to fetch player serve statistics: {source}");
            let answered = source.reached_api() || matches!(source, SourceError::HttpStatus { .. });
            (ServeStatsMap::new(), u32::from(answered))
        }
        Err(err) => {
            warn!("{err}");
            (ServeStatsMap::new(), 1)
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
