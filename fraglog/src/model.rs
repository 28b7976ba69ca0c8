use chrono::NaiveDateTime;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(MatchId);
id_type!(PlayerId);
id_type!(MatchPlayerId);
id_type!(KillId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: MatchId,
    /// Identifier as it appears in the log.
    pub external_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub exceeded_player_limit: bool,
}

impl Match {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Matches flagged for too many players are left out of every aggregate.
    pub fn is_valid(&self) -> bool {
        !self.exceeded_player_limit
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.ended_at.map(|end| (end - self.started_at).num_seconds())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlayer {
    pub id: MatchPlayerId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub kills_count: u64,
    pub deaths_count: u64,
    pub awards: Vec<String>,
}

impl MatchPlayer {
    pub fn score(&self) -> i64 {
        self.kills_count as i64 - self.deaths_count as i64
    }

    pub fn kd_ratio(&self) -> f64 {
        kd_ratio(self.kills_count, self.deaths_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kill {
    pub id: KillId,
    pub match_id: MatchId,
    /// `None` for deaths caused by the world.
    pub killer_id: Option<PlayerId>,
    pub victim_id: PlayerId,
    pub weapon: String,
    pub occurred_at: NaiveDateTime,
    pub world_kill: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKill {
    pub match_id: MatchId,
    pub killer_id: Option<PlayerId>,
    pub victim_id: PlayerId,
    pub weapon: String,
    pub occurred_at: NaiveDateTime,
}

impl NewKill {
    pub fn world_kill(&self) -> bool {
        self.killer_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Kills,
    Deaths,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    DeathlessVictory,
}

impl Award {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DeathlessVictory => "Deathless Victory",
        }
    }
}

/// Kills per death, with `(0, 0) -> 0.0` and `(k, 0) -> k`.
pub fn kd_ratio(kills: u64, deaths: u64) -> f64 {
    match (kills, deaths) {
        (0, 0) => 0.0,
        (k, 0) => k as f64,
        (k, d) => k as f64 / d as f64,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Highest score wins, the earliest entry wins a tie.
pub fn winner<'mp, I>(players: I) -> Option<&'mp MatchPlayer>
where
    I: IntoIterator<Item = &'mp MatchPlayer>,
{
    players.into_iter().fold(None, |best, mp| match best {
        Some(current) if current.score() >= mp.score() => Some(current),
        _ => Some(mp),
    })
}
