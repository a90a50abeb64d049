use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::markets::process_odds;
use crate::models::event::{EventRecord, OddsLine, ParticipantRecord};
use crate::pipelines::serve_stats::index::{get_all_player_stats, ServeStatsMap};
use crate::sources::{OddsFeed, SourceError, StatsFeed};
use crate::utils::json::{collection_items, field, is_truthy, lenient_string};
use crate::utils::names::normalize_player_name;
use crate::utils::prompt::Confirm;

pub const DEFAULT_OUTPUT_FILE: &str = "collected_tennis_data_atp_singles_pregame_with_stats.json";

const PRE_GAME: &str = "pre-game";

#[derive(Debug, Clone)]
pub struct OddsPipelineOptions {
    pub sport: String,
    pub stats_year: String,
    pub bookmaker: String,
    pub batch_size: usize,
    pub events_delay: Duration,
    pub odds_delay: Duration,
}

impl Default for OddsPipelineOptions {
    fn default() -> Self {
        Self {
            sport: "tennis".to_string(),
            stats_year: "2024".to_string(),
            bookmaker: "bet365".to_string(),
            batch_size: 5,
            events_delay: Duration::from_secs(1),
            odds_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Default)]
pub struct OddsPipelineReport {
    pub events: Vec<EventRecord>,
    pub request_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TournamentRef {
    pub id: String,
    pub name: String,
    pub category: String,
}

/// ATP singles tournaments from a tournaments payload (array or id-keyed
/// object): a truthy id, `Singles` in the name and category `ATP`.
pub fn select_atp_singles(tournaments: &Value) -> Vec<TournamentRef> {
    collection_items(tournaments)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(|t| {
            let id = t.get("tournamentId").and_then(truthy_id)?;
            let name = t.get("name").and_then(Value::as_str).unwrap_or_default();
            let category = t.get("categoryName").and_then(Value::as_str).unwrap_or_default();
            (name.contains("Singles") && category == "ATP").then(|| TournamentRef {
                id,
                name: name.to_string(),
                category: category.to_string(),
            })
        })
        .collect()
}

/// `None` when the `events` payload is neither an array nor an object.
pub fn pre_game_events(events_response: &Value) -> Option<Vec<&Map<String, Value>>> {
    let events = collection_items(events_response.get("events")?)?;
    Some(
        events
            .into_iter()
            .filter_map(Value::as_object)
            .filter(|e| e.get("eventStatus").and_then(Value::as_str) == Some(PRE_GAME))
            .collect(),
    )
}

/// Collects pre-game ATP singles events with both players' serve stats and
/// the configured bookmaker's odds. The operator confirms each tournament and
/// every further batch of events.
pub async fn run_odds_pipeline(
    odds_feed: &dyn OddsFeed,
    stats_feed: &dyn StatsFeed,
    confirm: &mut dyn Confirm,
    options: &OddsPipelineOptions,
) -> OddsPipelineReport {
    info!("Starting odds collection");
    let mut report = OddsPipelineReport::default();

    let (player_stats, stats_requests) = get_all_player_stats(stats_feed, &options.stats_year).await;
    report.request_count += stats_requests;
    if player_stats.is_empty() {
        warn!("Player statistics unavailable, events will not be enriched");
    }

    let tournaments = match odds_feed.tournaments(&options.sport).await {
        Ok(tournaments) => {
            report.request_count += 1;
            tournaments
        }
        Err(err) => {
            report.request_count += u32::from(err.reached_api());
            warn!("Failed to fetch tournaments: {err}");
            return report;
        }
    };

    if collection_items(&tournaments).is_none() {
        warn!("Unexpected tournaments payload: {tournaments}");
        return report;
    }

    let selected = select_atp_singles(&tournaments);
    info!("Found {} ATP Singles tournaments", selected.len());

    for (idx, tournament) in selected.iter().enumerate() {
        info!(
            "Tournament {}/{}: {} (id {}, category {})",
            idx + 1,
            selected.len(),
            tournament.name,
            tournament.id,
            tournament.category
        );

        if !confirm.confirm(&format!("Fetch events for tournament '{}'?", tournament.name)) {
            info!("Skipping tournament '{}'", tournament.name);
            continue;
        }

        collect_tournament(odds_feed, &player_stats, confirm, options, tournament, &mut report).await;
    }

    info!(
        "Odds collection finished: {} events, {} API requests",
        report.events.len(),
        report.request_count
    );
    report
}

async fn collect_tournament(
    odds_feed: &dyn OddsFeed,
    player_stats: &ServeStatsMap,
    confirm: &mut dyn Confirm,
    options: &OddsPipelineOptions,
    tournament: &TournamentRef,
    report: &mut OddsPipelineReport,
) {
    tokio::time::sleep(options.events_delay).await;

    let events_response = match odds_feed.events(&tournament.id).await {
        Ok(events) => {
            report.request_count += 1;
            events
        }
        Err(err) => {
            report.request_count += u32::from(err.reached_api());
            warn!("Failed to fetch events for '{}': {err}", tournament.name);
            return;
        }
    };

    let Some(pre_game) = pre_game_events(&events_response) else {
        warn!("Unexpected 'events' payload for '{}'", tournament.name);
        return;
    };

    info!("{} pre-game events for '{}'", pre_game.len(), tournament.name);

    let batch_size = options.batch_size.max(1);
    let total = pre_game.len();
    let mut start = 0;

    while start < total {
        let end = (start + batch_size).min(total);
        info!("Processing pre-game events {} to {} of {}", start + 1, end, total);

        for event in &pre_game[start..end] {
            if let Some(record) = collect_event(odds_feed, player_stats, options, tournament, event, report).await {
                report.events.push(record);
            }
        }

        start = end;
        if start >= total {
            info!("All {total} pre-game events for '{}' processed", tournament.name);
            break;
        }

        let next = batch_size.min(total - start);
        let question = format!(
            "Processed {end} of {total} pre-game events for '{}'. Process the next {next}?",
            tournament.name
        );
        if !confirm.confirm(&question) {
            info!("Stopping event processing for '{}'", tournament.name);
            break;
        }
    }
}

async fn collect_event(
    odds_feed: &dyn OddsFeed,
    player_stats: &ServeStatsMap,
    options: &OddsPipelineOptions,
    tournament: &TournamentRef,
    event: &Map<String, Value>,
    report: &mut OddsPipelineReport,
) -> Option<EventRecord> {
    let Some(event_id) = event.get("eventId").and_then(truthy_id) else {
        warn!("Event without id, skipping");
        return None;
    };

    let participant1 = participant(event, "participant1", "participant1Id", player_stats);
    let participant2 = participant(event, "participant2", "participant2Id", player_stats);
    info!("Event {event_id}: {} vs {}", participant1.name_api, participant2.name_api);

    tokio::time::sleep(options.odds_delay).await;
    let odds = fetch_event_odds(odds_feed, &event_id, &options.bookmaker, report).await;

    if odds.is_empty() {
        info!("No {} odds for event {event_id}", options.bookmaker);
    } else {
        info!("{} {} odds lines for event {event_id}", odds.len(), options.bookmaker);
    }

    Some(EventRecord {
        tournament_id: tournament.id.clone(),
        tournament_name: tournament.name.clone(),
        tournament_category: tournament.category.clone(),
        event_id,
        event_status: field(event, "eventStatus").cloned(),
        event_date: field(event, "date").cloned(),
        event_time: field(event, "time").cloned(),
        participant1,
        participant2,
        bookmaker_count_event: field(event, "bookmakerCount").cloned(),
        start_time_unix_event: field(event, "startTime").cloned(),
        bookmaker: options.bookmaker.clone(),
        odds,
    })
}

async fn fetch_event_odds(
    odds_feed: &dyn OddsFeed,
    event_id: &str,
    bookmaker: &str,
    report: &mut OddsPipelineReport,
) -> Vec<OddsLine> {
    let response = match odds_feed.odds(event_id, bookmaker).await {
        Ok(response) => {
            report.request_count += 1;
            response
        }
        Err(err) => {
            report.request_count += u32::from(err.reached_api());
            log_odds_error(event_id, &err);
            return Vec::new();
        }
    };

    if let Some(object) = response.as_object() {
        if !object.contains_key("markets") {
            if let Some(message) = object.get("message") {
                info!("Odds API message for event {event_id} ({bookmaker}): {message}");
                return Vec::new();
            }
        }
    }

    if response.as_array().is_some_and(Vec::is_empty) {
        info!("Odds API returned an empty list for event {event_id} ({bookmaker})");
        return Vec::new();
    }

    process_odds(&response, bookmaker, event_id)
}

/// Ids of `0`, `""` or `null` are treated as absent.
fn truthy_id(value: &Value) -> Option<String> {
    Some(value).filter(|v| is_truthy(v)).and_then(lenient_string)
}

fn log_odds_error(event_id: &str, err: &SourceError) {
    match err {
        SourceError::Decode { body, .. } => {
            warn!("Invalid JSON in odds response for event {event_id}: {body}")
        }
        other => warn!("Failed to fetch odds for event {event_id}: {other}"),
    }
}

fn participant(
    event: &Map<String, Value>,
    name_key: &str,
    id_key: &str,
    player_stats: &ServeStatsMap,
) -> ParticipantRecord {
    let name_api = event
        .get(name_key)
        .and_then(lenient_string)
        .unwrap_or_else(|| "N/A".to_string());

    let stats = if player_stats.is_empty() {
        None
    } else {
        let normalized = normalize_player_name(&name_api);
        let stats = player_stats.get(&normalized).cloned();
        if stats.is_none() {
            warn!("No statistics for {name_api} (normalized: '{normalized}')");
        }
        stats
    };

    ParticipantRecord {
        name_api,
        id_api: field(event, id_key).cloned(),
        stats,
    }
}
