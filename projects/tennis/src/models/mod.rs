pub mod event;
pub mod player_history;
pub mod serve_stats;
