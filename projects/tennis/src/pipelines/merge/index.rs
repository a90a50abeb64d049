use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::utils::names::NameIndex;

pub const STATS_RAW_FILE: &str = "stats_raw.json";
pub const STATS2_RAW_FILE: &str = "stats2_raw.json";
pub const OUTPUT_FILE: &str = "stats_clean.json";
pub const DEFAULT_MIN_YEAR: i64 = 2023;

const SURFACE_RECORD_KEYS: [&str; 2] = ["ReturnRecordStats", "ServiceRecordStats"];

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub min_year: i64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { min_year: DEFAULT_MIN_YEAR }
    }
}

/// Merges per-surface records and player histories into one object keyed by
/// player name.
///
/// `stats_raw` maps player ids to `{api_response}`; only ids present in
/// `id_to_name` make it in. `stats2_raw` entries are matched to those names
/// by the name part of their `"{name}_{id}"` key.
pub fn merge_player_stats(
    stats_raw: &Map<String, Value>,
    stats2_raw: &Map<String, Value>,
    id_to_name: &HashMap<String, String>,
    options: &MergeOptions,
) -> Map<String, Value> {
    let mut clean = Map::new();

    for (player_id, player_data) in stats_raw {
        let Some(name) = id_to_name.get(player_id) else {
            continue;
        };

        let entry = clean
            .entry(name.clone())
            .or_insert_with(|| json!({"player_id": player_id, "name": name}));

        if let (Some(entry), Some(response)) = (entry.as_object_mut(), player_data.get("api_response")) {
            copy_surface_records(entry, response);
        }
    }
    info!("{} players merged from the surface records", clean.len());

    let index: NameIndex = clean.keys().map(String::as_str).collect();
    let mut matched = 0;

    for (player_key, player_data) in stats2_raw {
        let raw_name = player_key.split('_').next().unwrap_or(player_key).trim();
        let Some(name) = index.resolve(raw_name) else {
            debug!("No merged player matches '{raw_name}'");
            continue;
        };
        let Some(entry) = clean.get_mut(name).and_then(Value::as_object_mut) else {
            continue;
        };
        matched += 1;

        if let Some(summary) = player_data.get("surface_summary") {
            let recent = recent_surface_items(summary, options.min_year);
            if !recent.is_empty() {
                entry.insert("surface_summary".to_string(), Value::Array(recent));
            }
        }

        if let Some(past_matches) = player_data.get("past_matches") {
            entry.insert("past_matches".to_string(), past_matches.clone());
        }
    }
    info!("{matched} player histories matched by name");

    clean
}

/// Copies `ReturnRecordStats` and `ServiceRecordStats` of each surface record
/// under `ReturnRecordStats{Surface}` and `ServiceRecordStats{Surface}`.
fn copy_surface_records(entry: &mut Map<String, Value>, response: &Value) {
    let records: Vec<&Value> = match response {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for record in records.into_iter().filter_map(Value::as_object) {
        let Some(surface) = record.get("Surface") else {
            continue;
        };
        let surface = match surface {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        for key in SURFACE_RECORD_KEYS {
            if let Some(stats) = record.get(key) {
                entry.insert(format!("{key}{surface}"), stats.clone());
            }
        }
    }
}

/// Items of `surface_summary.data` whose year is at least `min_year`.
pub fn recent_surface_items(summary: &Value, min_year: i64) -> Vec<Value> {
    summary
        .get("data")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.as_object().and_then(detect_year).is_some_and(|year| year >= min_year))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// The first year-like field (`year`, `season`, `eventyear` or any key
/// containing `year`, case-insensitive) holding an integer. Zero counts as
/// no year.
pub fn detect_year(item: &Map<String, Value>) -> Option<i64> {
    item.iter()
        .filter(|(key, _)| is_year_key(key))
        .find_map(|(_, value)| parse_year(value))
        .filter(|year| *year != 0)
}

fn is_year_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key == "season" || key.contains("year")
}

fn parse_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
