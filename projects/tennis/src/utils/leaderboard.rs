use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::serve_stats::PlayerServeStats;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 15;

/// Serve statistics the dashboard can rank players by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ServeStat {
    #[serde(rename = "avg-aces")]
    AvgAces,
    #[serde(rename = "first-serve")]
    FirstServe,
    #[serde(rename = "first-serve-points-won")]
    FirstServePointsWon,
    #[serde(rename = "avg-double-faults")]
    AvgDoubleFaults,
    #[serde(rename = "second-serve-points-won")]
    SecondServePointsWon,
    #[serde(rename = "service-games-won")]
    ServiceGamesWon,
}

impl ServeStat {
    pub const ALL: [ServeStat; 6] = [
        ServeStat::AvgAces,
        ServeStat::FirstServe,
        ServeStat::FirstServePointsWon,
        ServeStat::AvgDoubleFaults,
        ServeStat::SecondServePointsWon,
        ServeStat::ServiceGamesWon,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ServeStat::AvgAces => "avg-aces",
            ServeStat::FirstServe => "first-serve",
            ServeStat::FirstServePointsWon => "first-serve-points-won",
            ServeStat::AvgDoubleFaults => "avg-double-faults",
            ServeStat::SecondServePointsWon => "second-serve-points-won",
            ServeStat::ServiceGamesWon => "service-games-won",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServeStat::AvgAces => "Average aces per match",
            ServeStat::FirstServe => "First serve in",
            ServeStat::FirstServePointsWon => "First serve points won",
            ServeStat::AvgDoubleFaults => "Average double faults per match",
            ServeStat::SecondServePointsWon => "Second serve points won",
            ServeStat::ServiceGamesWon => "Service games won",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ServeStat::AvgAces => {
                "Average number of aces per match. Shows how often a player wins the point outright with the serve."
            }
            ServeStat::FirstServe => {
                "Percentage of first serves that land in. Measures first-serve consistency."
            }
            ServeStat::FirstServePointsWon => {
                "Percentage of points won when the first serve goes in."
            }
            ServeStat::AvgDoubleFaults => {
                "Average double faults per match. Lower is better, so the table lists the fewest first."
            }
            ServeStat::SecondServePointsWon => {
                "Percentage of points won on the second serve, the quality of the player's plan B."
            }
            ServeStat::ServiceGamesWon => {
                "Percentage of service games won, the overall measure of holding serve."
            }
        }
    }

    pub fn value(self, stats: &PlayerServeStats) -> Option<f64> {
        match self {
            ServeStat::AvgAces => stats.avg_aces_match,
            ServeStat::FirstServe => stats.first_serve_pct,
            ServeStat::FirstServePointsWon => stats.first_serve_points_won_pct,
            ServeStat::AvgDoubleFaults => stats.avg_dbl_faults_match,
            ServeStat::SecondServePointsWon => stats.second_serve_points_won_pct,
            ServeStat::ServiceGamesWon => stats.service_games_won_pct,
        }
    }

    pub fn lower_is_better(self) -> bool {
        matches!(self, ServeStat::AvgDoubleFaults)
    }

    pub fn is_percentage(self) -> bool {
        !matches!(self, ServeStat::AvgAces | ServeStat::AvgDoubleFaults)
    }
}

impl FromStr for ServeStat {
    type Err = UnknownServeStatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        ServeStat::ALL
            .into_iter()
            .find(|stat| stat.slug() == wanted)
            .ok_or(UnknownServeStatError { stat: value.to_string() })
    }
}

#[derive(Debug, Error)]
#[error("UnknownServeStat: {stat}")]
pub struct UnknownServeStatError {
    pub stat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub player_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub stat: ServeStat,
    pub label: &'static str,
    pub rows: Vec<LeaderboardRow>,
}

/// Top `limit` players for `stat`, ranked from 1. Players without a name or
/// a value for the stat are left out.
pub fn build_leaderboard(players: &[PlayerServeStats], stat: ServeStat, limit: usize) -> Leaderboard {
    let mut ranked: Vec<(&str, f64)> = players
        .iter()
        .filter_map(|p| Some((p.name()?, stat.value(p)?)))
        .collect();

    ranked.sort_by(|a, b| {
        let order = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        if stat.lower_is_better() { order } else { order.reverse() }
    });

    let rows = ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (name, value))| LeaderboardRow {
            rank: idx + 1,
            player_name: name.to_string(),
            value,
        })
        .collect();

    Leaderboard { stat, label: stat.label(), rows }
}

/// Fixed-width text rendering for the terminal.
pub fn render_table(leaderboard: &Leaderboard) -> String {
    let name_width = leaderboard
        .rows
        .iter()
        .map(|row| row.player_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());

    let mut out = format!("{}\n", leaderboard.label);
    out.push_str(&format!("{:>4}  {:<name_width$}  {:>8}\n", "#", "Player", "Value"));
    for row in &leaderboard.rows {
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>8.2}\n",
            row.rank, row.player_name, row.value
        ));
    }
    out
}
