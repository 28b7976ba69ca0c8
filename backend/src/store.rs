//! Postgres implementation of the fraglog repositories.
//!
//! Runs on a blocking connection, so callers on the async side go through
//! `spawn_blocking` (see [`crate::with_store`]).

use crate::schema::{kills, match_players, matches, players};
use crate::DbConnection;
use chrono::NaiveDateTime;
use diesel::expression::IntoSql;
use diesel::expression_methods::PgExpressionMethods;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Bool;
use fraglog::model::{
    Counter, Kill, Match, MatchId, MatchPlayer, MatchPlayerId, NewKill, Player, PlayerId,
};
use fraglog::store::{
    KillFilter, KillRepository, MatchPlayerRepository, MatchRepository, PlayerRepository,
    StoreError,
};

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

pub struct PgStore<'c> {
    conn: &'c mut DbConnection,
}

impl<'c> PgStore<'c> {
    pub fn new(conn: &'c mut DbConnection) -> Self {
        Self { conn }
    }
}

fn store_error(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::UniqueViolation(info.message().to_owned())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

fn not_found(entity: &'static str, id: i64) -> impl FnOnce(DieselError) -> StoreError {
    move |err| match err {
        DieselError::NotFound => StoreError::NotFound { entity, id },
        other => store_error(other),
    }
}

type KillPredicate = Box<dyn BoxableExpression<kills::table, Pg, SqlType = Bool>>;

fn kill_predicate(filter: KillFilter) -> KillPredicate {
    let mut predicate: KillPredicate = Box::new(true.into_sql::<Bool>());
    if let Some(match_id) = filter.match_id {
        predicate = Box::new(predicate.and(kills::match_id.eq(match_id.0)));
    }
    if let Some(killer_id) = filter.killer_id {
        predicate = Box::new(predicate.and(kills::killer_id.is_not_distinct_from(killer_id.0)));
    }
    if let Some(world_kill) = filter.world_kill {
        predicate = Box::new(predicate.and(kills::world_kill.eq(world_kill)));
    }
    predicate
}

impl MatchRepository for PgStore<'_> {
    fn find_match(&mut self, id: MatchId) -> Result<Option<Match>, StoreError> {
        let row = matches::table
            .find(id.0)
            .select(crate::models::Match::as_select())
            .first(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    fn find_match_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        let row = matches::table
            .filter(matches::match_id.eq(external_id))
            .select(crate::models::Match::as_select())
            .first(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    fn create_match(
        &mut self,
        external_id: &str,
        started_at: NaiveDateTime,
    ) -> Result<Match, StoreError> {
        let query = diesel::dsl::insert_into(matches::table).values(crate::models::NewMatch {
            match_id: external_id,
            started_at,
        });
        tracing::trace!(?query, "Create match query");

        let row = query
            .returning(crate::models::Match::as_returning())
            .get_result(self.conn)
            .map_err(store_error)?;
        Ok(row.into())
    }

    fn close_match(
        &mut self,
        id: MatchId,
        ended_at: NaiveDateTime,
        exceeded_player_limit: bool,
    ) -> Result<Match, StoreError> {
        let row = diesel::dsl::update(matches::table.find(id.0))
            .set((
                matches::ended_at.eq(Some(ended_at)),
                matches::exceeded_player_limit.eq(exceeded_player_limit),
            ))
            .returning(crate::models::Match::as_returning())
            .get_result(self.conn)
            .map_err(not_found("match", id.0))?;
        Ok(row.into())
    }

    fn list_matches(&mut self) -> Result<Vec<Match>, StoreError> {
        let rows: Vec<crate::models::Match> = matches::table
            .order(matches::id.asc())
            .select(crate::models::Match::as_select())
            .load(self.conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn delete_match(&mut self, id: MatchId) -> Result<bool, StoreError> {
        // match_players and kills go with it through ON DELETE CASCADE
        let deleted = diesel::dsl::delete(matches::table.find(id.0))
            .execute(self.conn)
            .map_err(store_error)?;
        Ok(deleted > 0)
    }
}

impl PlayerRepository for PgStore<'_> {
    fn find_player(&mut self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let row = players::table
            .find(id.0)
            .select(crate::models::Player::as_select())
            .first(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    fn find_player_by_name(&mut self, name: &str) -> Result<Option<Player>, StoreError> {
        let row = players::table
            .filter(lower(players::name).eq(lower(name.trim())))
            .select(crate::models::Player::as_select())
            .first(self.conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    fn create_player(&mut self, name: &str) -> Result<Player, StoreError> {
        let name = name.trim();

        // A failed INSERT would abort the surrounding transaction, so a name
        // conflict is detected through the missing returned row instead.
        let row = diesel::dsl::insert_into(players::table)
            .values(crate::models::NewPlayer { name })
            .on_conflict_do_nothing()
            .returning(crate::models::Player::as_returning())
            .get_result(self.conn)
            .optional()
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(StoreError::UniqueViolation(format!(
                "player name {:?} is taken",
                name
            ))),
        }
    }

    fn list_players(&mut self) -> Result<Vec<Player>, StoreError> {
        let rows: Vec<crate::models::Player> = players::table
            .order(players::id.asc())
            .select(crate::models::Player::as_select())
            .load(self.conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn count_players(&mut self) -> Result<usize, StoreError> {
        let count: i64 = players::table
            .count()
            .get_result(self.conn)
            .map_err(store_error)?;
        Ok(count as usize)
    }
}

impl MatchPlayerRepository for PgStore<'_> {
    fn find_or_create_match_player(
        &mut self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<MatchPlayer, StoreError> {
        diesel::dsl::insert_into(match_players::table)
            .values(crate::models::NewMatchPlayer {
                match_id: match_id.0,
                player_id: player_id.0,
            })
            .on_conflict((match_players::match_id, match_players::player_id))
            .do_nothing()
            .execute(self.conn)
            .map_err(store_error)?;

        let row = match_players::table
            .filter(match_players::match_id.eq(match_id.0))
            .filter(match_players::player_id.eq(player_id.0))
            .select(crate::models::MatchPlayer::as_select())
            .first(self.conn)
            .map_err(store_error)?;
        Ok(row.into())
    }

    fn increment(&mut self, id: MatchPlayerId, counter: Counter) -> Result<(), StoreError> {
        let target = match_players::table.find(id.0);
        let updated = match counter {
            Counter::Kills => diesel::dsl::update(target)
                .set(match_players::kills_count.eq(match_players::kills_count + 1))
                .execute(self.conn),
            Counter::Deaths => diesel::dsl::update(target)
                .set(match_players::deaths_count.eq(match_players::deaths_count + 1))
                .execute(self.conn),
        }
        .map_err(store_error)?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "match player",
                id: id.0,
            });
        }
        Ok(())
    }

    fn set_awards(&mut self, id: MatchPlayerId, awards: Vec<String>) -> Result<(), StoreError> {
        let updated = diesel::dsl::update(match_players::table.find(id.0))
            .set(match_players::awards.eq(awards))
            .execute(self.conn)
            .map_err(store_error)?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "match player",
                id: id.0,
            });
        }
        Ok(())
    }

    fn match_players_for_match(
        &mut self,
        match_id: MatchId,
    ) -> Result<Vec<MatchPlayer>, StoreError> {
        let rows: Vec<crate::models::MatchPlayer> = match_players::table
            .filter(match_players::match_id.eq(match_id.0))
            .order(match_players::id.asc())
            .select(crate::models::MatchPlayer::as_select())
            .load(self.conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn participations_for_player(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Vec<(Match, MatchPlayer)>, StoreError> {
        let rows: Vec<(crate::models::Match, crate::models::MatchPlayer)> = match_players::table
            .inner_join(matches::table)
            .filter(match_players::player_id.eq(player_id.0))
            .order(match_players::id.asc())
            .select((
                crate::models::Match::as_select(),
                crate::models::MatchPlayer::as_select(),
            ))
            .load(self.conn)
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|(m, mp)| (m.into(), mp.into()))
            .collect())
    }

    fn count_players_in_match(&mut self, match_id: MatchId) -> Result<usize, StoreError> {
        let count: i64 = match_players::table
            .filter(match_players::match_id.eq(match_id.0))
            .count()
            .get_result(self.conn)
            .map_err(store_error)?;
        Ok(count as usize)
    }
}

impl KillRepository for PgStore<'_> {
    fn create_kill(&mut self, kill: NewKill) -> Result<Kill, StoreError> {
        let match_id = kill.match_id.0;
        let row = diesel::dsl::insert_into(kills::table)
            .values(crate::models::NewKill::from(kill))
            .returning(crate::models::Kill::as_returning())
            .get_result(self.conn)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    StoreError::NotFound {
                        entity: "match",
                        id: match_id,
                    }
                }
                other => store_error(other),
            })?;
        Ok(row.into())
    }

    fn kills_for_match(&mut self, match_id: MatchId) -> Result<Vec<Kill>, StoreError> {
        let rows: Vec<crate::models::Kill> = kills::table
            .filter(kills::match_id.eq(match_id.0))
            .order(kills::id.asc())
            .select(crate::models::Kill::as_select())
            .load(self.conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn weapon_counts(&mut self, filter: KillFilter) -> Result<Vec<(String, usize)>, StoreError> {
        let query = kills::table
            .filter(kill_predicate(filter))
            .group_by(kills::weapon)
            .select((kills::weapon, diesel::dsl::count_star()))
            .order(diesel::dsl::min(kills::id).asc());
        tracing::trace!(query = %diesel::debug_query::<diesel::pg::Pg, _>(&query), "Weapon counts query");

        let counts: Vec<(String, i64)> = query.load(self.conn).map_err(store_error)?;
        Ok(counts
            .into_iter()
            .map(|(weapon, count)| (weapon, count as usize))
            .collect())
    }

    fn count_kills(&mut self, filter: KillFilter) -> Result<usize, StoreError> {
        let count: i64 = kills::table
            .filter(kill_predicate(filter))
            .count()
            .get_result(self.conn)
            .map_err(store_error)?;
        Ok(count as usize)
    }
}
