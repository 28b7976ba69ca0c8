use super::*;
use crate::model::KillId;

/// Vector backed store, rows are kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    matches: Vec<Match>,
    players: Vec<Player>,
    match_players: Vec<MatchPlayer>,
    kills: Vec<Kill>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `func` and throws away everything it wrote if it returns `Err`.
    pub fn transaction<T, E, F>(&mut self, func: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.clone();
        let result = func(self);
        if result.is_err() {
            tracing::debug!("Rolling back memory store");
            *self = snapshot;
        }
        result
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn match_players(&self) -> &[MatchPlayer] {
        &self.match_players
    }

    pub fn kills(&self) -> &[Kill] {
        &self.kills
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn match_mut(&mut self, id: MatchId) -> Result<&mut Match, StoreError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound {
                entity: "match",
                id: id.0,
            })
    }

    fn match_player_mut(&mut self, id: MatchPlayerId) -> Result<&mut MatchPlayer, StoreError> {
        self.match_players
            .iter_mut()
            .find(|mp| mp.id == id)
            .ok_or(StoreError::NotFound {
                entity: "match player",
                id: id.0,
            })
    }
}

fn same_name(stored: &str, name: &str) -> bool {
    stored.trim().to_lowercase() == name.trim().to_lowercase()
}

impl MatchRepository for MemoryStore {
    fn find_match(&mut self, id: MatchId) -> Result<Option<Match>, StoreError> {
        Ok(self.matches.iter().find(|m| m.id == id).cloned())
    }

    fn find_match_by_external_id(&mut self, external_id: &str) -> Result<Option<Match>, StoreError> {
        Ok(self
            .matches
            .iter()
            .find(|m| m.external_id == external_id)
            .cloned())
    }

    fn create_match(
        &mut self,
        external_id: &str,
        started_at: NaiveDateTime,
    ) -> Result<Match, StoreError> {
        if self.matches.iter().any(|m| m.external_id == external_id) {
            return Err(StoreError::UniqueViolation(format!(
                "match {}",
                external_id
            )));
        }

        let created = Match {
            id: MatchId(self.next_id()),
            external_id: external_id.to_owned(),
            started_at,
            ended_at: None,
            exceeded_player_limit: false,
        };
        self.matches.push(created.clone());
        Ok(created)
    }

    fn close_match(
        &mut self,
        id: MatchId,
        ended_at: NaiveDateTime,
        exceeded_player_limit: bool,
    ) -> Result<Match, StoreError> {
        let entry = self.match_mut(id)?;
        entry.ended_at = Some(ended_at);
        entry.exceeded_player_limit = exceeded_player_limit;
        Ok(entry.clone())
    }

    fn list_matches(&mut self) -> Result<Vec<Match>, StoreError> {
        Ok(self.matches.clone())
    }

    fn delete_match(&mut self, id: MatchId) -> Result<bool, StoreError> {
        let before = self.matches.len();
        self.matches.retain(|m| m.id != id);
        if self.matches.len() == before {
            return Ok(false);
        }

        self.match_players.retain(|mp| mp.match_id != id);
        self.kills.retain(|k| k.match_id != id);
        Ok(true)
    }
}

impl PlayerRepository for MemoryStore {
    fn find_player(&mut self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.players.iter().find(|p| p.id == id).cloned())
    }

    fn find_player_by_name(&mut self, name: &str) -> Result<Option<Player>, StoreError> {
        Ok(self
            .players
            .iter()
            .find(|p| same_name(&p.name, name))
            .cloned())
    }

    fn create_player(&mut self, name: &str) -> Result<Player, StoreError> {
        if self.players.iter().any(|p| same_name(&p.name, name)) {
            return Err(StoreError::UniqueViolation(format!("player {}", name)));
        }

        let created = Player {
            id: PlayerId(self.next_id()),
            name: name.trim().to_owned(),
        };
        self.players.push(created.clone());
        Ok(created)
    }

    fn list_players(&mut self) -> Result<Vec<Player>, StoreError> {
        Ok(self.players.clone())
    }

    fn count_players(&mut self) -> Result<usize, StoreError> {
        Ok(self.players.len())
    }
}

impl MatchPlayerRepository for MemoryStore {
    fn find_or_create_match_player(
        &mut self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<MatchPlayer, StoreError> {
        if let Some(existing) = self
            .match_players
            .iter()
            .find(|mp| mp.match_id == match_id && mp.player_id == player_id)
        {
            return Ok(existing.clone());
        }

        let created = MatchPlayer {
            id: MatchPlayerId(self.next_id()),
            match_id,
            player_id,
            kills_count: 0,
            deaths_count: 0,
            awards: Vec::new(),
        };
        self.match_players.push(created.clone());
        Ok(created)
    }

    fn increment(&mut self, id: MatchPlayerId, counter: Counter) -> Result<(), StoreError> {
        let entry = self.match_player_mut(id)?;
        match counter {
            Counter::Kills => entry.kills_count += 1,
            Counter::Deaths => entry.deaths_count += 1,
        };
        Ok(())
    }

    fn set_awards(&mut self, id: MatchPlayerId, awards: Vec<String>) -> Result<(), StoreError> {
        self.match_player_mut(id)?.awards = awards;
        Ok(())
    }

    fn match_players_for_match(
        &mut self,
        match_id: MatchId,
    ) -> Result<Vec<MatchPlayer>, StoreError> {
        Ok(self
            .match_players
            .iter()
            .filter(|mp| mp.match_id == match_id)
            .cloned()
            .collect())
    }

    fn participations_for_player(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Vec<(Match, MatchPlayer)>, StoreError> {
        let mut participations = Vec::new();
        for mp in self.match_players.iter().filter(|mp| mp.player_id == player_id) {
            let owner = self
                .matches
                .iter()
                .find(|m| m.id == mp.match_id)
                .ok_or(StoreError::NotFound {
                    entity: "match",
                    id: mp.match_id.0,
                })?;
            participations.push((owner.clone(), mp.clone()));
        }
        Ok(participations)
    }

    fn count_players_in_match(&mut self, match_id: MatchId) -> Result<usize, StoreError> {
        Ok(self
            .match_players
            .iter()
            .filter(|mp| mp.match_id == match_id)
            .count())
    }
}

impl KillRepository for MemoryStore {
    fn create_kill(&mut self, kill: NewKill) -> Result<Kill, StoreError> {
        if !self.matches.iter().any(|m| m.id == kill.match_id) {
            return Err(StoreError::NotFound {
                entity: "match",
                id: kill.match_id.0,
            });
        }

        let world_kill = kill.world_kill();
        let created = Kill {
            id: KillId(self.next_id()),
            match_id: kill.match_id,
            killer_id: kill.killer_id,
            victim_id: kill.victim_id,
            weapon: kill.weapon,
            occurred_at: kill.occurred_at,
            world_kill,
        };
        self.kills.push(created.clone());
        Ok(created)
    }

    fn kills_for_match(&mut self, match_id: MatchId) -> Result<Vec<Kill>, StoreError> {
        Ok(self
            .kills
            .iter()
            .filter(|k| k.match_id == match_id)
            .cloned()
            .collect())
    }

    fn weapon_counts(&mut self, filter: KillFilter) -> Result<Vec<(String, usize)>, StoreError> {
        Ok(count_weapons(
            self.kills
                .iter()
                .filter(|k| filter.matches(k))
                .map(|k| k.weapon.as_str()),
        ))
    }

    fn count_kills(&mut self, filter: KillFilter) -> Result<usize, StoreError> {
        Ok(self.kills.iter().filter(|k| filter.matches(k)).count())
    }
}
