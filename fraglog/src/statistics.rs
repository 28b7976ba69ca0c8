//! Read-only views over stored matches.
//!
//! Matches flagged with `exceeded_player_limit` never contribute to the
//! cross-match aggregates. Ties are always resolved in persistence order, the
//! sorts used here are stable.

use crate::model::{self, Match, MatchId, MatchPlayer, PlayerId};
use crate::store::{KillFilter, Store, StoreError};
use common::statistics::{
    GlobalSummary, KillFeedEntry, MatchHistoryEntry, MatchRanking, MatchSummary, PlayerProfile,
    PlayerRanking, PlayerWeapons, WeaponUsage,
};
use common::MatchOverview;
use std::collections::HashMap;

pub const SUMMARY_TOP_PLAYERS: usize = 5;
pub const SUMMARY_TOP_WEAPONS: usize = 5;
pub const WORLD: &str = "WORLD";

pub struct StatisticsAggregator<'s, S: ?Sized> {
    store: &'s mut S,
}

impl<'s, S> StatisticsAggregator<'s, S>
where
    S: Store + ?Sized,
{
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Every player, most kills first.
    #[tracing::instrument(skip(self))]
    pub fn global_rankings(&mut self) -> Result<Vec<PlayerRanking>, StoreError> {
        let winners = self.winners()?;
        let players = self.store.list_players()?;

        let mut rankings = Vec::with_capacity(players.len());
        for player in players {
            let totals = self.totals(player.id, &winners)?;
            rankings.push(PlayerRanking {
                player_id: player.id.0,
                name: player.name,
                total_kills: totals.kills,
                total_deaths: totals.deaths,
                kd_ratio: model::round2(model::kd_ratio(totals.kills, totals.deaths)),
                matches_played: totals.history.len(),
                matches_won: totals.won,
            });
        }

        rankings.sort_by(|a, b| b.total_kills.cmp(&a.total_kills));
        Ok(rankings)
    }

    pub fn top_players(&mut self, limit: usize) -> Result<Vec<PlayerRanking>, StoreError> {
        let mut rankings = self.global_rankings()?;
        rankings.truncate(limit);
        Ok(rankings)
    }

    #[tracing::instrument(skip(self))]
    pub fn player_profile(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerProfile>, StoreError> {
        let player = match self.store.find_player(player_id)? {
            Some(p) => p,
            None => return Ok(None),
        };

        let winners = self.winners()?;
        let totals = self.totals(player.id, &winners)?;
        let played = totals.history.len();

        Ok(Some(PlayerProfile {
            player_id: player.id.0,
            name: player.name,
            total_kills: totals.kills,
            total_deaths: totals.deaths,
            kd_ratio: model::round2(model::kd_ratio(totals.kills, totals.deaths)),
            matches_played: played,
            matches_won: totals.won,
            average_kills_per_match: average(totals.kills, played),
            average_deaths_per_match: average(totals.deaths, played),
            match_history: totals.history,
        }))
    }

    /// Weapons by number of player kills, world kills are never counted.
    pub fn most_used_weapons(&mut self) -> Result<Vec<WeaponUsage>, StoreError> {
        let counts = self.store.weapon_counts(KillFilter::player_kills())?;
        Ok(sorted_usage(counts))
    }

    #[tracing::instrument(skip(self))]
    pub fn summary(&mut self) -> Result<GlobalSummary, StoreError> {
        let valid: Vec<Match> = self
            .store
            .list_matches()?
            .into_iter()
            .filter(Match::is_valid)
            .collect();

        let (mut total_kills, mut total_deaths) = (0, 0);
        for m in valid.iter() {
            for mp in self.store.match_players_for_match(m.id)? {
                total_kills += mp.kills_count;
                total_deaths += mp.deaths_count;
            }
        }

        let mut most_used_weapons = self.most_used_weapons()?;
        most_used_weapons.truncate(SUMMARY_TOP_WEAPONS);

        Ok(GlobalSummary {
            total_matches: valid.len(),
            total_players: self.store.count_players()?,
            total_kills,
            total_deaths,
            average_kills_per_match: average(total_kills, valid.len()),
            top_players: self.top_players(SUMMARY_TOP_PLAYERS)?,
            most_used_weapons,
        })
    }

    /// All matches, most recently started first.
    pub fn match_overview(&mut self) -> Result<Vec<MatchOverview>, StoreError> {
        let mut matches = self.store.list_matches()?;
        matches.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        let mut overview = Vec::with_capacity(matches.len());
        for m in matches {
            overview.push(MatchOverview {
                id: m.id.0,
                players: self.store.count_players_in_match(m.id)?,
                active: m.is_active(),
                match_id: m.external_id,
                started_at: m.started_at,
                ended_at: m.ended_at,
                exceeded_player_limit: m.exceeded_player_limit,
            });
        }
        Ok(overview)
    }

    #[tracing::instrument(skip(self))]
    pub fn match_statistics(&mut self, match_id: MatchId) -> Result<Option<MatchSummary>, StoreError> {
        let current = match self.store.find_match(match_id)? {
            Some(m) => m,
            None => return Ok(None),
        };

        let names: HashMap<PlayerId, String> = self
            .store
            .list_players()?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let name_of = |id: PlayerId| names.get(&id).cloned().unwrap_or_default();

        let match_players = self.store.match_players_for_match(match_id)?;
        let winner = model::winner(&match_players).map(|mp| mp.player_id);

        let mut ranked: Vec<&MatchPlayer> = match_players.iter().collect();
        ranked.sort_by(|a, b| b.kills_count.cmp(&a.kills_count));

        let rankings = ranked
            .iter()
            .map(|mp| MatchRanking {
                player_id: mp.player_id.0,
                name: name_of(mp.player_id),
                kills: mp.kills_count,
                deaths: mp.deaths_count,
                score: mp.score(),
                kd_ratio: mp.kd_ratio(),
                awards: mp.awards.clone(),
            })
            .collect();

        let mut player_weapons = Vec::with_capacity(ranked.len());
        for mp in ranked.iter() {
            player_weapons.push(PlayerWeapons {
                name: name_of(mp.player_id),
                weapons: self.player_weapon_stats(match_id, mp.player_id)?,
            });
        }

        let mut kills = self.store.kills_for_match(match_id)?;
        kills.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        let kill_feed = kills
            .into_iter()
            .map(|k| KillFeedEntry {
                killer: match k.killer_id {
                    Some(id) if !k.world_kill => name_of(id),
                    _ => WORLD.to_owned(),
                },
                victim: name_of(k.victim_id),
                weapon: k.weapon,
                occurred_at: k.occurred_at,
                world_kill: k.world_kill,
            })
            .collect();

        let match_kills = KillFilter::player_kills().in_match(match_id);

        Ok(Some(MatchSummary {
            duration_seconds: current.duration_seconds(),
            match_id: current.external_id,
            started_at: current.started_at,
            ended_at: current.ended_at,
            exceeded_player_limit: current.exceeded_player_limit,
            total_kills: self.store.count_kills(match_kills)?,
            total_world_kills: self
                .store
                .count_kills(KillFilter::world_kills().in_match(match_id))?,
            winner: winner.map(name_of),
            winner_favorite_weapon: match winner {
                Some(id) => self.favorite_weapon(match_id, id)?,
                None => None,
            },
            most_deadly_weapon: top_weapon(self.store.weapon_counts(match_kills)?),
            rankings,
            kill_feed,
            player_weapons,
        }))
    }

    /// Weapons the player killed with in this match, most used first.
    pub fn player_weapon_stats(
        &mut self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<Vec<WeaponUsage>, StoreError> {
        let counts = self.store.weapon_counts(
            KillFilter::player_kills()
                .in_match(match_id)
                .by_killer(player_id),
        )?;
        Ok(sorted_usage(counts))
    }

    pub fn favorite_weapon(
        &mut self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<Option<String>, StoreError> {
        let counts = self.store.weapon_counts(
            KillFilter::player_kills()
                .in_match(match_id)
                .by_killer(player_id),
        )?;
        Ok(top_weapon(counts))
    }

    fn winners(&mut self) -> Result<HashMap<MatchId, PlayerId>, StoreError> {
        let mut winners = HashMap::new();
        for m in self.store.list_matches()?.into_iter().filter(Match::is_valid) {
            let match_players = self.store.match_players_for_match(m.id)?;
            if let Some(w) = model::winner(&match_players) {
                winners.insert(m.id, w.player_id);
            }
        }
        Ok(winners)
    }

    fn totals(
        &mut self,
        player_id: PlayerId,
        winners: &HashMap<MatchId, PlayerId>,
    ) -> Result<Totals, StoreError> {
        let mut totals = Totals::default();

        for (m, mp) in self.store.participations_for_player(player_id)? {
            if !m.is_valid() {
                continue;
            }

            let won = winners.get(&m.id) == Some(&player_id);
            if won {
                totals.won += 1;
            }
            totals.kills += mp.kills_count;
            totals.deaths += mp.deaths_count;
            totals.history.push(MatchHistoryEntry {
                match_id: m.external_id,
                started_at: m.started_at,
                kills: mp.kills_count,
                deaths: mp.deaths_count,
                score: mp.score(),
                kd_ratio: model::round2(mp.kd_ratio()),
                won,
            });
        }

        Ok(totals)
    }
}

#[derive(Debug, Default)]
struct Totals {
    kills: u64,
    deaths: u64,
    won: usize,
    history: Vec<MatchHistoryEntry>,
}

fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    model::round2(total as f64 / count as f64)
}

fn sorted_usage(counts: Vec<(String, usize)>) -> Vec<WeaponUsage> {
    let mut usage: Vec<WeaponUsage> = counts
        .into_iter()
        .map(|(weapon, count)| WeaponUsage { weapon, count })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count));
    usage
}

/// Most counted weapon, the first one recorded wins a tie.
fn top_weapon(counts: Vec<(String, usize)>) -> Option<String> {
    counts
        .into_iter()
        .fold(None, |best: Option<(String, usize)>, (weapon, count)| match best {
            Some(current) if current.1 >= count => Some(current),
            _ => Some((weapon, count)),
        })
        .map(|(weapon, _)| weapon)
}
