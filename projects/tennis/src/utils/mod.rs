pub mod chart;
pub mod failure_streak;
pub mod json;
pub mod leaderboard;
pub mod names;
pub mod prompt;
