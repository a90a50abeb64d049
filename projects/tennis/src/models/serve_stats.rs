use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::json::{deserialize_lenient_f64, deserialize_lenient_string};

/// Feed field names paired with the snake_case names they are stored under.
pub const FEED_FIELDS: [(&str, &str); 9] = [
    ("PlayerId", "player_id"),
    ("PlayerName", "player_name_raw"),
    ("AvgAcesPerMatchSortField", "avg_aces_match"),
    ("AvgDblFaultsPerMatchSortField", "avg_dbl_faults_match"),
    ("FirstServePctSortField", "first_serve_pct"),
    ("FirstServePointsWonPctSortField", "first_serve_points_won_pct"),
    ("SecondServePointsWonPctSortField", "second_serve_points_won_pct"),
    ("ServeRatingSortField", "serve_rating"),
    ("ServiceGamesWonPctSortField", "service_games_won_pct"),
];

/// A feed item renamed to snake_case with its values untouched. Fields the
/// item lacks are null.
pub fn rename_feed_fields(item: &Map<String, Value>) -> Map<String, Value> {
    FEED_FIELDS
        .iter()
        .map(|(feed, name)| (name.to_string(), item.get(*feed).cloned().unwrap_or(Value::Null)))
        .collect()
}

/// One player's row from the global serve statistics feed.
///
/// Deserializes from the feed's `...SortField` names and serializes with
/// snake_case names; both spellings are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerServeStats {
    #[serde(alias = "PlayerId", default, deserialize_with = "deserialize_lenient_string")]
    pub player_id: Option<String>,

    #[serde(alias = "PlayerName", default, deserialize_with = "deserialize_lenient_string")]
    pub player_name_raw: Option<String>,

    #[serde(alias = "AvgAcesPerMatchSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub avg_aces_match: Option<f64>,

    #[serde(alias = "AvgDblFaultsPerMatchSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub avg_dbl_faults_match: Option<f64>,

    #[serde(alias = "FirstServePctSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub first_serve_pct: Option<f64>,

    #[serde(alias = "FirstServePointsWonPctSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub first_serve_points_won_pct: Option<f64>,

    #[serde(alias = "SecondServePointsWonPctSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub second_serve_points_won_pct: Option<f64>,

    #[serde(alias = "ServeRatingSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub serve_rating: Option<f64>,

    #[serde(alias = "ServiceGamesWonPctSortField", default, deserialize_with = "deserialize_lenient_f64")]
    pub service_games_won_pct: Option<f64>,
}

impl PlayerServeStats {
    pub fn name(&self) -> Option<&str> {
        self.player_name_raw.as_deref()
    }
}
