use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::models::player_history::TournamentPlayer;
use crate::pipelines::player_history::index::{
    collect_histories, collected_at_now, CollectionOptions, CollectionOutcome, HistoryCandidate,
    HistoryRecords,
};
use crate::sources::{AtpFeed, SourceError};
use crate::utils::json::{is_truthy, lenient_string};

pub const OUTPUT_FILE: &str = "stats3_raw.json";
pub const DEFAULT_TOURNAMENT_ID: &str = "20340";

const MATCH_LIST_KEYS: [&str; 4] = ["matches", "results", "rounds", "participants"];
const MATCH_SIDE_KEYS: [&str; 4] = ["homeTeam", "awayTeam", "participant1", "participant2"];
const FROM_MATCH_LIST: &str = "tournament_results";

/// Players keyed by their id rendered as text.
pub type TournamentPlayers = BTreeMap<String, TournamentPlayer>;

#[derive(Debug, Error)]
pub enum CollectTournamentPlayersError {
    #[error("TournamentRequest: {source}")]
    TournamentRequest {
        #[from]
        source: SourceError,
    },

    #[error("TournamentEmpty: {tournament_id}")]
    TournamentEmpty {
        tournament_id: String,
    },

    #[error("NoPlayersFound: {tournament_id}")]
    NoPlayersFound {
        tournament_id: String,
    },

    #[error("NoPlayersAfterFilter: {tournament_id}")]
    NoPlayersAfterFilter {
        tournament_id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct TournamentInfo {
    pub tournament_id: String,
    pub collected_at: String,
    pub total_players_in_tournament: usize,
    pub filtered_players_count: usize,
    pub tournament_raw_data: Value,
}

/// Contents of the tournament history file.
#[derive(Debug, Serialize)]
pub struct TournamentCollection {
    pub tournament_info: TournamentInfo,
    pub players: HistoryRecords<TournamentPlayer>,
}

#[derive(Debug)]
pub struct TournamentRun {
    pub collection: TournamentCollection,
    pub processed: usize,
    pub succeeded: usize,
    pub aborted: bool,
}

/// Every player found anywhere in a tournament results payload.
///
/// Objects with a truthy `id` and `name` are players found at their JSON
/// path. Lists under `matches`, `results`, `rounds` or `participants` also
/// contribute the `homeTeam`, `awayTeam`, `participant1` and `participant2`
/// objects of each item, even without a name. When an id shows up more than
/// once the last sighting wins.
pub fn extract_tournament_players(tournament: &Value) -> TournamentPlayers {
    let mut players = TournamentPlayers::new();
    search(tournament, "", &mut players);
    players
}

fn search(value: &Value, path: &str, players: &mut TournamentPlayers) {
    match value {
        Value::Object(object) => {
            if let (Some(id), Some(name)) = (object.get("id"), object.get("name")) {
                if is_truthy(id) && is_truthy(name) {
                    let found_in = if path.is_empty() { "tournament_data" } else { path };
                    record(players, id, Some(name), found_in);
                }
            }

            for (key, child) in object {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                if MATCH_LIST_KEYS.contains(&key.as_str()) {
                    extract_match_sides(child, players);
                }
                search(child, &child_path, players);
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                search(item, &format!("{path}[{idx}]"), players);
            }
        }
        _ => {}
    }
}

fn extract_match_sides(matches: &Value, players: &mut TournamentPlayers) {
    let Some(matches) = matches.as_array() else {
        return;
    };

    for side in matches
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|m| MATCH_SIDE_KEYS.iter().filter_map(|key| m.get(*key)))
        .filter_map(Value::as_object)
    {
        if let Some(id) = side.get("id").filter(|id| is_truthy(id)) {
            record(players, id, side.get("name"), FROM_MATCH_LIST);
        }
    }
}

fn record(players: &mut TournamentPlayers, id: &Value, name: Option<&Value>, found_in: &str) {
    players.insert(
        lenient_string(id).unwrap_or_else(|| id.to_string()),
        TournamentPlayer {
            id: id.clone(),
            name: name.and_then(Value::as_str).map(str::to_string),
            found_in: found_in.to_string(),
        },
    );
}

/// Players whose trimmed, lowercased name is in `known_names`. `None` keeps
/// every player.
pub fn filter_known_players(players: &TournamentPlayers, known_names: Option<&HashSet<String>>) -> TournamentPlayers {
    let Some(known_names) = known_names else {
        return players.clone();
    };

    players
        .iter()
        .filter(|(_, player)| {
            let name = player.name.as_deref().unwrap_or_default().trim().to_lowercase();
            known_names.contains(&name)
        })
        .map(|(id, player)| {
            info!("Match found: {} (id {id})", player.name.as_deref().unwrap_or_default());
            (id.clone(), player.clone())
        })
        .collect()
}

/// `"{name}_{id}"` with spaces replaced by underscores; nameless players
/// are called `Player_{id}`.
pub fn tournament_player_key(id: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{name}_{id}").replace(' ', "_"),
        None => format!("Player_{id}_{id}"),
    }
}

/// Extracts the players of a tournament, keeps the ones listed in the stats
/// CSV and collects their surface summary and match history.
pub async fn collect_tournament_players(
    feed: &dyn AtpFeed,
    tournament_id: &str,
    known_names: Option<&HashSet<String>>,
    options: &CollectionOptions,
) -> Result<TournamentRun, CollectTournamentPlayersError> {
    info!("Fetching results for tournament {tournament_id}");
    let tournament = feed.tournament_results(tournament_id).await?;
    if !is_truthy(&tournament) {
        return Err(CollectTournamentPlayersError::TournamentEmpty {
            tournament_id: tournament_id.to_string(),
        });
    }

    let players = extract_tournament_players(&tournament);
    info!("Found {} unique players in the tournament", players.len());
    if players.is_empty() {
        return Err(CollectTournamentPlayersError::NoPlayersFound {
            tournament_id: tournament_id.to_string(),
        });
    }

    if known_names.is_none() {
        info!("No player names in the stats CSV, keeping every tournament player");
    }
    let filtered = filter_known_players(&players, known_names);
    info!("{} tournament players kept after the stats CSV filter", filtered.len());
    if filtered.is_empty() {
        return Err(CollectTournamentPlayersError::NoPlayersAfterFilter {
            tournament_id: tournament_id.to_string(),
        });
    }

    let collected_at = collected_at_now();
    let total_players_in_tournament = players.len();
    let filtered_players_count = filtered.len();

    let candidates = filtered
        .into_iter()
        .map(|(id, player)| HistoryCandidate {
            key: tournament_player_key(&id, player.name.as_deref()),
            name: player.name.clone().unwrap_or_else(|| format!("Player_{id}")),
            id,
            info: player,
        })
        .collect();

    let CollectionOutcome { records, processed, succeeded, aborted } =
        collect_histories(feed, candidates, options).await;

    Ok(TournamentRun {
        collection: TournamentCollection {
            tournament_info: TournamentInfo {
                tournament_id: tournament_id.to_string(),
                collected_at,
                total_players_in_tournament,
                filtered_players_count,
                tournament_raw_data: tournament,
            },
            players: records,
        },
        processed,
        succeeded,
        aborted,
    })
}
