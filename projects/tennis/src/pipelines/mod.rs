pub mod categories {
    pub mod index;
}
pub mod merge {
    pub mod index;
}
pub mod odds {
    pub mod index;
    pub mod markets;
}
pub mod player_history {
    pub mod index;
}
pub mod serve_stats {
    pub mod index;
}
pub mod top_players {
    pub mod index;
}
pub mod tournament_players {
    pub mod index;
}
