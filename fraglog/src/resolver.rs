//! Maps names and external match ids onto stored entities.

use crate::model::{Match, Player};
use crate::store::{MatchRepository, PlayerRepository, StoreError};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResolution {
    /// Freshly created, or found and still running.
    Open(Match),
    /// Found with an end time, it must not be reopened.
    AlreadyCompleted(Match),
}

/// Finds the player ignoring case and surrounding whitespace, creating it on
/// first sight.
pub fn resolve_player<S>(store: &mut S, name: &str) -> Result<Player, StoreError>
where
    S: PlayerRepository + ?Sized,
{
    let name = name.trim();

    if let Some(player) = store.find_player_by_name(name)? {
        return Ok(player);
    }

    match store.create_player(name) {
        Ok(player) => {
            tracing::debug!(?player, "Created player");
            Ok(player)
        }
        // Someone else created it between our lookup and insert
        Err(StoreError::UniqueViolation(_)) => {
            store
                .find_player_by_name(name)?
                .ok_or(StoreError::Backend(format!(
                    "player {:?} vanished after unique violation",
                    name
                )))
        }
        Err(e) => Err(e),
    }
}

pub fn resolve_or_open_match<S>(
    store: &mut S,
    external_id: &str,
    started_at: NaiveDateTime,
) -> Result<MatchResolution, StoreError>
where
    S: MatchRepository + ?Sized,
{
    match store.find_match_by_external_id(external_id)? {
        Some(existing) if existing.ended_at.is_some() => {
            Ok(MatchResolution::AlreadyCompleted(existing))
        }
        Some(existing) => Ok(MatchResolution::Open(existing)),
        None => Ok(MatchResolution::Open(
            store.create_match(external_id, started_at)?,
        )),
    }
}
