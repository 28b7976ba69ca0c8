use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerRanking {
    pub player_id: i64,
    pub name: String,
    pub total_kills: u64,
    pub total_deaths: u64,
    pub kd_ratio: f64,
    pub matches_played: usize,
    pub matches_won: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerProfile {
    pub player_id: i64,
    pub name: String,
    pub total_kills: u64,
    pub total_deaths: u64,
    pub kd_ratio: f64,
    pub matches_played: usize,
    pub matches_won: usize,
    pub average_kills_per_match: f64,
    pub average_deaths_per_match: f64,
    pub match_history: Vec<MatchHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchHistoryEntry {
    pub match_id: String,
    pub started_at: NaiveDateTime,
    pub kills: u64,
    pub deaths: u64,
    pub score: i64,
    pub kd_ratio: f64,
    pub won: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WeaponUsage {
    pub weapon: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlobalSummary {
    pub total_matches: usize,
    pub total_players: usize,
    pub total_kills: u64,
    pub total_deaths: u64,
    pub average_kills_per_match: f64,
    pub top_players: Vec<PlayerRanking>,
    pub most_used_weapons: Vec<WeaponUsage>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchRanking {
    pub player_id: i64,
    pub name: String,
    pub kills: u64,
    pub deaths: u64,
    pub score: i64,
    pub kd_ratio: f64,
    pub awards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KillFeedEntry {
    /// Killer name, or `WORLD` for environmental deaths.
    pub killer: String,
    pub victim: String,
    pub weapon: String,
    pub occurred_at: NaiveDateTime,
    pub world_kill: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerWeapons {
    pub name: String,
    pub weapons: Vec<WeaponUsage>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub duration_seconds: Option<i64>,
    pub exceeded_player_limit: bool,
    pub total_kills: usize,
    pub total_world_kills: usize,
    pub winner: Option<String>,
    pub winner_favorite_weapon: Option<String>,
    pub most_deadly_weapon: Option<String>,
    pub rankings: Vec<MatchRanking>,
    pub kill_feed: Vec<KillFeedEntry>,
    pub player_weapons: Vec<PlayerWeapons>,
}
