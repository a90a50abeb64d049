use serde::Serialize;
use serde_json::Value;

/// Ranking entry a top-players run starts from.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlayerInfo {
    pub id: Value,
    pub name: String,
    pub ranking_data: Value,
}

/// Player found somewhere in a tournament results payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentPlayer {
    pub id: Value,
    pub name: Option<String>,
    pub found_in: String,
}

/// Raw surface summary and match history collected for one player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerHistoryRecord<I> {
    pub player_info: I,
    pub collected_at: String,
    pub surface_summary: Option<Value>,
    pub past_matches: Option<Value>,
}
