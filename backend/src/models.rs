use diesel::prelude::*;
use fraglog::model;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Match {
    pub id: i64,
    pub match_id: String,
    pub started_at: chrono::NaiveDateTime,
    pub ended_at: Option<chrono::NaiveDateTime>,
    pub exceeded_player_limit: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::matches)]
pub struct NewMatch<'a> {
    pub match_id: &'a str,
    pub started_at: chrono::NaiveDateTime,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Player {
    pub id: i64,
    pub name: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::players)]
pub struct NewPlayer<'a> {
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::match_players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MatchPlayer {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub kills_count: i32,
    pub deaths_count: i32,
    pub awards: Vec<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::match_players)]
pub struct NewMatchPlayer {
    pub match_id: i64,
    pub player_id: i64,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::kills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Kill {
    pub id: i64,
    pub match_id: i64,
    pub killer_id: Option<i64>,
    pub victim_id: i64,
    pub weapon: String,
    pub occurred_at: chrono::NaiveDateTime,
    pub world_kill: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::kills)]
pub struct NewKill {
    pub match_id: i64,
    pub killer_id: Option<i64>,
    pub victim_id: i64,
    pub weapon: String,
    pub occurred_at: chrono::NaiveDateTime,
    pub world_kill: bool,
}

impl From<Match> for model::Match {
    fn from(row: Match) -> Self {
        Self {
            id: model::MatchId(row.id),
            external_id: row.match_id,
            started_at: row.started_at,
            ended_at: row.ended_at,
            exceeded_player_limit: row.exceeded_player_limit,
        }
    }
}

impl From<Player> for model::Player {
    fn from(row: Player) -> Self {
        Self {
            id: model::PlayerId(row.id),
            name: row.name,
        }
    }
}

impl From<MatchPlayer> for model::MatchPlayer {
    fn from(row: MatchPlayer) -> Self {
        Self {
            id: model::MatchPlayerId(row.id),
            match_id: model::MatchId(row.match_id),
            player_id: model::PlayerId(row.player_id),
            kills_count: row.kills_count.max(0) as u64,
            deaths_count: row.deaths_count.max(0) as u64,
            awards: row.awards,
        }
    }
}

impl From<Kill> for model::Kill {
    fn from(row: Kill) -> Self {
        Self {
            id: model::KillId(row.id),
            match_id: model::MatchId(row.match_id),
            killer_id: row.killer_id.map(model::PlayerId),
            victim_id: model::PlayerId(row.victim_id),
            weapon: row.weapon,
            occurred_at: row.occurred_at,
            world_kill: row.world_kill,
        }
    }
}

impl From<model::NewKill> for NewKill {
    fn from(kill: model::NewKill) -> Self {
        Self {
            world_kill: kill.world_kill(),
            match_id: kill.match_id.0,
            killer_id: kill.killer_id.map(|k| k.0),
            victim_id: kill.victim_id.0,
            weapon: kill.weapon,
            occurred_at: kill.occurred_at,
        }
    }
}
