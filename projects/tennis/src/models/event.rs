use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One flattened market outcome for a single bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsLine {
    pub market: String,
    pub short: String,
    pub handicap: Option<Value>,
    pub odds_type: String,
    pub outcome: String,
    pub odds: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRecord {
    pub name_api: String,
    pub id_api: Option<Value>,
    /// Feed values renamed to snake_case, see `rename_feed_fields`.
    #[serde(serialize_with = "stats_or_not_available")]
    pub stats: Option<Map<String, Value>>,
}

/// A pre-game event enriched with both players' serve stats and its odds.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub tournament_id: String,
    pub tournament_name: String,
    pub tournament_category: String,
    pub event_id: String,
    pub event_status: Option<Value>,
    pub event_date: Option<Value>,
    pub event_time: Option<Value>,
    pub participant1: ParticipantRecord,
    pub participant2: ParticipantRecord,
    pub bookmaker_count_event: Option<Value>,
    pub start_time_unix_event: Option<Value>,
    pub bookmaker: String,
    pub odds: Vec<OddsLine>,
}

fn stats_or_not_available<S>(stats: &Option<Map<String, Value>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match stats {
        Some(stats) => stats.serialize(serializer),
        None => serializer.serialize_str("N/A"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stats_serialize_as_not_available() {
        let participant = ParticipantRecord {
            name_api: "Unknown Player".into(),
            id_api: None,
            stats: None,
        };
        let value = serde_json::to_value(&participant).unwrap();
        assert_eq!(value["stats"], "N/A");
        assert!(value["id_api"].is_null());
    }
}
