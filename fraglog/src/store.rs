//! Storage seam used by the ingestion engine and the statistics.
//!
//! Every method states what it reads or writes, there is no lazy association
//! loading. Ids are handed out in creation order, so "persistence order"
//! means ascending id everywhere.

use crate::model::{
    Counter, Kill, Match, MatchId, MatchPlayer, MatchPlayerId, NewKill, Player, PlayerId,
};
use chrono::NaiveDateTime;

mod memory;
pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("storage backend: {0}")]
    Backend(String),
}

pub trait MatchRepository {
    fn find_match(&mut self, id: MatchId) -> Result<Option<Match>, StoreError>;

    fn find_match_by_external_id(&mut self, external_id: &str) -> Result<Option<Match>, StoreError>;

    fn create_match(
        &mut self,
        external_id: &str,
        started_at: NaiveDateTime,
    ) -> Result<Match, StoreError>;

    fn close_match(
        &mut self,
        id: MatchId,
        ended_at: NaiveDateTime,
        exceeded_player_limit: bool,
    ) -> Result<Match, StoreError>;

    fn list_matches(&mut self) -> Result<Vec<Match>, StoreError>;

    /// Removes the match together with its match players and kills.
    fn delete_match(&mut self, id: MatchId) -> Result<bool, StoreError>;
}

pub trait PlayerRepository {
    fn find_player(&mut self, id: PlayerId) -> Result<Option<Player>, StoreError>;

    /// Case-insensitive lookup on the trimmed name.
    fn find_player_by_name(&mut self, name: &str) -> Result<Option<Player>, StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] if the name is taken, ignoring case.
    fn create_player(&mut self, name: &str) -> Result<Player, StoreError>;

    fn list_players(&mut self) -> Result<Vec<Player>, StoreError>;

    fn count_players(&mut self) -> Result<usize, StoreError>;
}

pub trait MatchPlayerRepository {
    fn find_or_create_match_player(
        &mut self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<MatchPlayer, StoreError>;

    fn increment(&mut self, id: MatchPlayerId, counter: Counter) -> Result<(), StoreError>;

    fn set_awards(&mut self, id: MatchPlayerId, awards: Vec<String>) -> Result<(), StoreError>;

    fn match_players_for_match(&mut self, match_id: MatchId)
        -> Result<Vec<MatchPlayer>, StoreError>;

    /// Every match the player took part in, ordered by match player id.
    fn participations_for_player(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Vec<(Match, MatchPlayer)>, StoreError>;

    fn count_players_in_match(&mut self, match_id: MatchId) -> Result<usize, StoreError>;
}

/// Narrows kill queries, `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KillFilter {
    pub match_id: Option<MatchId>,
    pub killer_id: Option<PlayerId>,
    pub world_kill: Option<bool>,
}

impl KillFilter {
    pub fn player_kills() -> Self {
        Self {
            world_kill: Some(false),
            ..Self::default()
        }
    }

    pub fn world_kills() -> Self {
        Self {
            world_kill: Some(true),
            ..Self::default()
        }
    }

    pub fn in_match(mut self, match_id: MatchId) -> Self {
        self.match_id = Some(match_id);
        self
    }

    pub fn by_killer(mut self, killer_id: PlayerId) -> Self {
        self.killer_id = Some(killer_id);
        self
    }

    pub fn matches(&self, kill: &Kill) -> bool {
        self.match_id.map_or(true, |m| kill.match_id == m)
            && self.killer_id.map_or(true, |k| kill.killer_id == Some(k))
            && self.world_kill.map_or(true, |w| kill.world_kill == w)
    }
}

pub trait KillRepository {
    fn create_kill(&mut self, kill: NewKill) -> Result<Kill, StoreError>;

    fn kills_for_match(&mut self, match_id: MatchId) -> Result<Vec<Kill>, StoreError>;

    /// Weapon histogram in the order each weapon was first recorded.
    fn weapon_counts(&mut self, filter: KillFilter) -> Result<Vec<(String, usize)>, StoreError>;

    fn count_kills(&mut self, filter: KillFilter) -> Result<usize, StoreError>;
}

pub trait Store: MatchRepository + PlayerRepository + MatchPlayerRepository + KillRepository {}

impl<T> Store for T where
    T: MatchRepository + PlayerRepository + MatchPlayerRepository + KillRepository
{
}

/// Groups weapons in first-seen order. Shared by stores that count in memory.
pub fn count_weapons<'k, I>(weapons: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'k str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for weapon in weapons {
        match counts.iter_mut().find(|(w, _)| w == weapon) {
            Some((_, count)) => *count += 1,
            None => counts.push((weapon.to_owned(), 1)),
        }
    }
    counts
}
