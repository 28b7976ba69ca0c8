//! Per-document match state machine.
//!
//! The state lives in an [`IngestContext`] owned by a single ingestion run
//! and is handed to every step, nothing here is shared between runs.

use crate::classifier::Event;
use crate::error::SoftError;
use crate::model::{self, Award, Counter, Match, MatchPlayerId, NewKill, PlayerId};
use crate::resolver::{self, MatchResolution};
use crate::store::{Store, StoreError};
use chrono::NaiveDateTime;
use std::collections::HashMap;

#[derive(Debug)]
pub struct ActiveMatch {
    pub current: Match,
    /// Match players already fetched for this match, dropped on close.
    players: HashMap<PlayerId, MatchPlayerId>,
}

impl ActiveMatch {
    fn new(current: Match) -> Self {
        Self {
            current,
            players: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub enum MatchState {
    #[default]
    NoActiveMatch,
    Active(ActiveMatch),
}

#[derive(Debug, Default)]
pub struct IngestContext {
    pub state: MatchState,
    /// External ids of closed matches seen again, deduplicated, first-seen order.
    pub already_processed: Vec<String>,
    pub soft_errors: Vec<SoftError>,
}

impl IngestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_match(&self) -> Option<&Match> {
        match &self.state {
            MatchState::Active(active) => Some(&active.current),
            MatchState::NoActiveMatch => None,
        }
    }

    fn record_already_processed(&mut self, external_id: &str) {
        if !self.already_processed.iter().any(|id| id == external_id) {
            self.already_processed.push(external_id.to_owned());
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchLifecycleTracker {
    max_players: usize,
}

impl MatchLifecycleTracker {
    pub fn new(max_players: usize) -> Self {
        Self { max_players }
    }

    /// Applies one classified line. `line` is only used for error messages.
    pub fn apply<S>(
        &self,
        store: &mut S,
        ctx: &mut IngestContext,
        line: &str,
        timestamp: NaiveDateTime,
        event: Event,
    ) -> Result<(), StoreError>
    where
        S: Store + ?Sized,
    {
        match event {
            Event::MatchStart { match_id } => self.start(store, ctx, &match_id, timestamp),
            Event::MatchEnd { match_id } => self.end(store, ctx, &match_id, timestamp),
            Event::WorldKill { victim, weapon } => {
                self.kill(store, ctx, None, &victim, weapon, timestamp)
            }
            Event::PlayerKill {
                killer,
                victim,
                weapon,
            } => self.kill(store, ctx, Some(&killer), &victim, weapon, timestamp),
            Event::Unknown(_) => {
                let error = SoftError::UnknownEventFormat {
                    line: line.to_owned(),
                };
                tracing::warn!("{}", error);
                ctx.soft_errors.push(error);
                Ok(())
            }
        }
    }

    fn start<S>(
        &self,
        store: &mut S,
        ctx: &mut IngestContext,
        external_id: &str,
        started_at: NaiveDateTime,
    ) -> Result<(), StoreError>
    where
        S: Store + ?Sized,
    {
        if let MatchState::Active(active) = &ctx.state {
            tracing::warn!(
                abandoned = %active.current.external_id,
                "Match started while another one was still open"
            );
        }

        match resolver::resolve_or_open_match(store, external_id, started_at)? {
            MatchResolution::AlreadyCompleted(existing) => {
                tracing::warn!(match_id = %existing.external_id, "Match was already processed");
                ctx.record_already_processed(&existing.external_id);
                ctx.state = MatchState::NoActiveMatch;
            }
            MatchResolution::Open(opened) => {
                tracing::info!(match_id = %opened.external_id, "Opened match");
                ctx.state = MatchState::Active(ActiveMatch::new(opened));
            }
        };

        Ok(())
    }

    fn end<S>(
        &self,
        store: &mut S,
        ctx: &mut IngestContext,
        external_id: &str,
        ended_at: NaiveDateTime,
    ) -> Result<(), StoreError>
    where
        S: Store + ?Sized,
    {
        let active = match std::mem::take(&mut ctx.state) {
            MatchState::Active(active)
                if active.current.external_id == external_id
                    && ended_at >= active.current.started_at =>
            {
                active
            }
            MatchState::Active(active) if active.current.external_id == external_id => {
                tracing::warn!(
                    match_id = %external_id,
                    started_at = %active.current.started_at,
                    %ended_at,
                    "Ignoring end dated before the match start"
                );
                ctx.state = MatchState::Active(active);
                return Ok(());
            }
            other => {
                tracing::debug!(match_id = %external_id, "Ignoring end of a match that is not open");
                ctx.state = other;
                return Ok(());
            }
        };

        let match_id = active.current.id;
        let players = store.count_players_in_match(match_id)?;

        if players > self.max_players {
            store.close_match(match_id, ended_at, true)?;

            let error = SoftError::PlayerLimitExceeded {
                match_id: external_id.to_owned(),
                players,
                max: self.max_players,
            };
            tracing::warn!("{}", error);
            ctx.soft_errors.push(error);
        } else {
            self.assign_awards(store, &active.current)?;
            store.close_match(match_id, ended_at, false)?;
        }

        tracing::info!(match_id = %external_id, players, "Closed match");

        Ok(())
    }

    fn assign_awards<S>(&self, store: &mut S, current: &Match) -> Result<(), StoreError>
    where
        S: Store + ?Sized,
    {
        let match_players = store.match_players_for_match(current.id)?;
        let winner = match model::winner(&match_players) {
            Some(w) => w,
            None => return Ok(()),
        };

        let mut awards = Vec::new();
        if winner.deaths_count == 0 {
            awards.push(Award::DeathlessVictory.label().to_owned());
        }

        if !awards.is_empty() {
            tracing::debug!(player = %winner.player_id, ?awards, "Assigning awards");
            store.set_awards(winner.id, awards)?;
        }

        Ok(())
    }

    fn kill<S>(
        &self,
        store: &mut S,
        ctx: &mut IngestContext,
        killer: Option<&str>,
        victim: &str,
        weapon: String,
        occurred_at: NaiveDateTime,
    ) -> Result<(), StoreError>
    where
        S: Store + ?Sized,
    {
        let active = match &mut ctx.state {
            MatchState::Active(active) => active,
            MatchState::NoActiveMatch => {
                tracing::debug!("Ignoring kill outside of a match");
                return Ok(());
            }
        };

        let victim = resolver::resolve_player(store, victim)?;
        let killer = match killer {
            Some(name) => Some(resolver::resolve_player(store, name)?),
            None => None,
        };

        store.create_kill(NewKill {
            match_id: active.current.id,
            killer_id: killer.as_ref().map(|k| k.id),
            victim_id: victim.id,
            weapon,
            occurred_at,
        })?;

        if let Some(killer) = killer {
            let id = match_player(store, active, killer.id)?;
            store.increment(id, Counter::Kills)?;
        }

        let id = match_player(store, active, victim.id)?;
        store.increment(id, Counter::Deaths)?;

        Ok(())
    }
}

fn match_player<S>(
    store: &mut S,
    active: &mut ActiveMatch,
    player_id: PlayerId,
) -> Result<MatchPlayerId, StoreError>
where
    S: Store + ?Sized,
{
    if let Some(id) = active.players.get(&player_id) {
        return Ok(*id);
    }

    let created = store.find_or_create_match_player(active.current.id, player_id)?;
    active.players.insert(player_id, created.id);
    Ok(created.id)
}
