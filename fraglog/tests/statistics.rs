use chrono::NaiveDateTime;
use common::statistics::{KillFeedEntry, MatchHistoryEntry, WeaponUsage};
use fraglog::classifier::TIMESTAMP_FORMAT;
use fraglog::model::{self, Counter, Match, NewKill, Player};
use fraglog::store::{
    KillFilter, KillRepository, MatchPlayerRepository, MatchRepository, PlayerRepository,
};
use fraglog::{LogIngestionEngine, MemoryStore, StatisticsAggregator};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn at(ts: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).unwrap()
}

fn closed_match(store: &mut MemoryStore, id: &str, start: &str, end: &str) -> Match {
    let m = store.create_match(id, at(start)).unwrap();
    store.close_match(m.id, at(end), false).unwrap()
}

fn played(store: &mut MemoryStore, m: &Match, p: &Player, kills: u64, deaths: u64) {
    let mp = store.find_or_create_match_player(m.id, p.id).unwrap();
    for _ in 0..kills {
        store.increment(mp.id, Counter::Kills).unwrap();
    }
    for _ in 0..deaths {
        store.increment(mp.id, Counter::Deaths).unwrap();
    }
}

fn kill(store: &mut MemoryStore, m: &Match, killer: Option<&Player>, victim: &Player, weapon: &str, ts: &str) {
    store
        .create_kill(NewKill {
            match_id: m.id,
            killer_id: killer.map(|k| k.id),
            victim_id: victim.id,
            weapon: weapon.to_owned(),
            occurred_at: at(ts),
        })
        .unwrap();
}

fn usage(weapons: &[(&str, usize)]) -> Vec<WeaponUsage> {
    weapons
        .iter()
        .map(|(weapon, count)| WeaponUsage {
            weapon: weapon.to_string(),
            count: *count,
        })
        .collect()
}

struct Global {
    store: MemoryStore,
    roman: Player,
    nick: Player,
    marcus: Player,
}

fn global_store() -> Global {
    let mut store = MemoryStore::new();
    let roman = store.create_player("Roman").unwrap();
    let nick = store.create_player("Nick").unwrap();
    let marcus = store.create_player("Marcus").unwrap();

    let match1 = closed_match(&mut store, "1", "01/05/2020 10:00:00", "01/05/2020 10:30:00");
    let match2 = closed_match(&mut store, "2", "02/05/2020 10:00:00", "02/05/2020 10:30:00");

    played(&mut store, &match1, &roman, 10, 2);
    played(&mut store, &match1, &nick, 5, 8);
    played(&mut store, &match2, &roman, 7, 3);
    played(&mut store, &match2, &marcus, 12, 1);

    kill(&mut store, &match1, Some(&roman), &nick, "M16", "01/05/2020 10:01:00");
    kill(&mut store, &match1, Some(&roman), &nick, "M16", "01/05/2020 10:02:00");
    kill(&mut store, &match1, Some(&nick), &roman, "AK47", "01/05/2020 10:03:00");
    for minute in 4..7 {
        kill(&mut store, &match1, None, &nick, "DROWN", &format!("01/05/2020 10:0{}:00", minute));
    }
    kill(&mut store, &match2, Some(&marcus), &roman, "AWP", "02/05/2020 10:01:00");
    kill(&mut store, &match2, Some(&marcus), &roman, "AK47", "02/05/2020 10:02:00");

    Global {
        store,
        roman,
        nick,
        marcus,
    }
}

#[test]
fn ratio_boundaries() {
    assert_eq!(0.0, model::kd_ratio(0, 0));
    assert_eq!(5.0, model::kd_ratio(5, 0));
    assert_eq!(2.5, model::kd_ratio(10, 4));
    assert_eq!(0.0, model::kd_ratio(0, 3));
}

#[test]
#[traced_test]
fn global_rankings() {
    let mut global = global_store();
    let rankings = StatisticsAggregator::new(&mut global.store)
        .global_rankings()
        .unwrap();

    let names: Vec<_> = rankings.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(vec!["Roman", "Marcus", "Nick"], names);

    let roman = &rankings[0];
    assert_eq!(global.roman.id.0, roman.player_id);
    assert_eq!(17, roman.total_kills);
    assert_eq!(5, roman.total_deaths);
    assert_eq!(3.4, roman.kd_ratio);
    assert_eq!(2, roman.matches_played);
    assert_eq!(1, roman.matches_won);

    let marcus = &rankings[1];
    assert_eq!(12.0, marcus.kd_ratio);
    assert_eq!(1, marcus.matches_won);

    let nick = &rankings[2];
    assert_eq!(0.63, nick.kd_ratio);
    assert_eq!(0, nick.matches_won);
}

#[test]
#[traced_test]
fn top_players() {
    let mut global = global_store();
    let top = StatisticsAggregator::new(&mut global.store)
        .top_players(2)
        .unwrap();

    assert_eq!(2, top.len());
    assert_eq!("Roman", top[0].name);
    assert_eq!("Marcus", top[1].name);
}

#[test]
fn ranking_ties_keep_creation_order() {
    let mut store = MemoryStore::new();
    let zed = store.create_player("Zed").unwrap();
    let amy = store.create_player("Amy").unwrap();
    let m = closed_match(&mut store, "1", "01/05/2020 10:00:00", "01/05/2020 10:30:00");
    played(&mut store, &m, &amy, 3, 0);
    played(&mut store, &m, &zed, 3, 0);

    let rankings = StatisticsAggregator::new(&mut store).global_rankings().unwrap();
    let names: Vec<_> = rankings.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(vec!["Zed", "Amy"], names);
}

#[test]
#[traced_test]
fn invalid_matches_are_left_out() {
    let mut global = global_store();

    let crowded = global
        .store
        .create_match("3", at("03/05/2020 10:00:00"))
        .unwrap();
    played(&mut global.store, &crowded, &global.nick, 50, 0);
    kill(&mut global.store, &crowded, Some(&global.nick), &global.roman, "KNIFE", "03/05/2020 10:01:00");
    global
        .store
        .close_match(crowded.id, at("03/05/2020 10:30:00"), true)
        .unwrap();

    let mut stats = StatisticsAggregator::new(&mut global.store);

    let rankings = stats.global_rankings().unwrap();
    let nick = rankings.iter().find(|r| r.name == "Nick").unwrap();
    assert_eq!(5, nick.total_kills);
    assert_eq!(1, nick.matches_played);

    let profile = stats.player_profile(global.nick.id).unwrap().unwrap();
    assert_eq!(1, profile.match_history.len());

    let summary = stats.summary().unwrap();
    assert_eq!(2, summary.total_matches);
    assert_eq!(34, summary.total_kills);

    // Kills of invalid matches still feed the weapon histogram
    assert_eq!(
        usage(&[("M16", 2), ("AK47", 2), ("AWP", 1), ("KNIFE", 1)]),
        stats.most_used_weapons().unwrap()
    );

    assert_eq!(9, global.store.count_kills(KillFilter::default()).unwrap());
}

#[test]
#[traced_test]
fn player_profile() {
    let mut global = global_store();
    let profile = StatisticsAggregator::new(&mut global.store)
        .player_profile(global.roman.id)
        .unwrap()
        .unwrap();

    assert_eq!("Roman", profile.name);
    assert_eq!(17, profile.total_kills);
    assert_eq!(5, profile.total_deaths);
    assert_eq!(3.4, profile.kd_ratio);
    assert_eq!(2, profile.matches_played);
    assert_eq!(1, profile.matches_won);
    assert_eq!(8.5, profile.average_kills_per_match);
    assert_eq!(2.5, profile.average_deaths_per_match);
    assert_eq!(
        vec![
            MatchHistoryEntry {
                match_id: "1".to_owned(),
                started_at: at("01/05/2020 10:00:00"),
                kills: 10,
                deaths: 2,
                score: 8,
                kd_ratio: 5.0,
                won: true,
            },
            MatchHistoryEntry {
                match_id: "2".to_owned(),
                started_at: at("02/05/2020 10:00:00"),
                kills: 7,
                deaths: 3,
                score: 4,
                kd_ratio: 2.33,
                won: false,
            },
        ],
        profile.match_history
    );
}

#[test]
fn profile_without_matches() {
    let mut store = MemoryStore::new();
    let lonely = store.create_player("Lonely").unwrap();

    let mut stats = StatisticsAggregator::new(&mut store);
    let profile = stats.player_profile(lonely.id).unwrap().unwrap();

    assert_eq!(0, profile.matches_played);
    assert_eq!(0.0, profile.kd_ratio);
    assert_eq!(0.0, profile.average_kills_per_match);
    assert_eq!(0.0, profile.average_deaths_per_match);
    assert!(profile.match_history.is_empty());

    assert_eq!(None, stats.player_profile(model::PlayerId(999)).unwrap());
}

#[test]
#[traced_test]
fn most_used_weapons_skip_world_kills() {
    let mut global = global_store();
    let weapons = StatisticsAggregator::new(&mut global.store)
        .most_used_weapons()
        .unwrap();

    assert_eq!(usage(&[("M16", 2), ("AK47", 2), ("AWP", 1)]), weapons);
}

#[test]
#[traced_test]
fn summary() {
    let mut global = global_store();
    let summary = StatisticsAggregator::new(&mut global.store).summary().unwrap();

    assert_eq!(2, summary.total_matches);
    assert_eq!(3, summary.total_players);
    assert_eq!(34, summary.total_kills);
    assert_eq!(14, summary.total_deaths);
    assert_eq!(17.0, summary.average_kills_per_match);
    assert_eq!(3, summary.top_players.len());
    assert_eq!(global.roman.id.0, summary.top_players[0].player_id);
    assert_eq!(global.marcus.id.0, summary.top_players[1].player_id);
    assert_eq!(usage(&[("M16", 2), ("AK47", 2), ("AWP", 1)]), summary.most_used_weapons);
}

#[test]
fn empty_summary() {
    let mut store = MemoryStore::new();
    let summary = StatisticsAggregator::new(&mut store).summary().unwrap();

    assert_eq!(0, summary.total_matches);
    assert_eq!(0.0, summary.average_kills_per_match);
    assert!(summary.top_players.is_empty());
    assert!(summary.most_used_weapons.is_empty());
}

struct Single {
    store: MemoryStore,
    current: Match,
    roman: Player,
    nick: Player,
}

fn single_match_store() -> Single {
    let mut store = MemoryStore::new();
    let roman = store.create_player("Roman").unwrap();
    let nick = store.create_player("Nick").unwrap();
    let marcus = store.create_player("Marcus").unwrap();
    let current = closed_match(&mut store, "77", "01/05/2020 10:00:00", "01/05/2020 10:30:00");

    played(&mut store, &current, &roman, 10, 2);
    played(&mut store, &current, &nick, 5, 8);
    played(&mut store, &current, &marcus, 7, 4);

    kill(&mut store, &current, Some(&roman), &nick, "M16", "01/05/2020 10:01:00");
    kill(&mut store, &current, Some(&roman), &marcus, "M16", "01/05/2020 10:02:00");
    kill(&mut store, &current, Some(&roman), &nick, "AK47", "01/05/2020 10:03:00");
    kill(&mut store, &current, Some(&marcus), &roman, "AWP", "01/05/2020 10:04:00");
    kill(&mut store, &current, None, &nick, "DROWN", "01/05/2020 10:00:30");

    Single {
        store,
        current,
        roman,
        nick,
    }
}

#[test]
#[traced_test]
fn match_statistics() {
    let mut single = single_match_store();
    let summary = StatisticsAggregator::new(&mut single.store)
        .match_statistics(single.current.id)
        .unwrap()
        .unwrap();

    assert_eq!("77", summary.match_id);
    assert_eq!(Some(1800), summary.duration_seconds);
    assert_eq!(4, summary.total_kills);
    assert_eq!(1, summary.total_world_kills);
    assert_eq!(Some("Roman".to_owned()), summary.winner);
    assert_eq!(Some("M16".to_owned()), summary.winner_favorite_weapon);
    assert_eq!(Some("M16".to_owned()), summary.most_deadly_weapon);

    let names: Vec<_> = summary.rankings.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(vec!["Roman", "Marcus", "Nick"], names);
    let roman = &summary.rankings[0];
    assert_eq!((10, 2, 8), (roman.kills, roman.deaths, roman.score));
    assert_eq!(5.0, roman.kd_ratio);
    assert!(roman.awards.is_empty());

    assert_eq!(5, summary.kill_feed.len());
    assert_eq!(
        KillFeedEntry {
            killer: "WORLD".to_owned(),
            victim: "Nick".to_owned(),
            weapon: "DROWN".to_owned(),
            occurred_at: at("01/05/2020 10:00:30"),
            world_kill: true,
        },
        summary.kill_feed[0]
    );
    assert!(summary
        .kill_feed
        .windows(2)
        .all(|pair| pair[0].occurred_at <= pair[1].occurred_at));

    assert_eq!("Roman", summary.player_weapons[0].name);
    assert_eq!(usage(&[("M16", 2), ("AK47", 1)]), summary.player_weapons[0].weapons);
    assert_eq!("Nick", summary.player_weapons[2].name);
    assert!(summary.player_weapons[2].weapons.is_empty());
}

#[test]
fn most_deadly_weapon_ignores_world_kills() {
    let mut single = single_match_store();
    for _ in 0..5 {
        kill(&mut single.store, &single.current, None, &single.nick, "DROWN", "01/05/2020 10:05:00");
    }

    let summary = StatisticsAggregator::new(&mut single.store)
        .match_statistics(single.current.id)
        .unwrap()
        .unwrap();

    assert_eq!(Some("M16".to_owned()), summary.most_deadly_weapon);
    assert_eq!(4, summary.total_kills);
    assert_eq!(6, summary.total_world_kills);
}

#[test]
fn player_weapon_stats() {
    let mut single = single_match_store();
    let mut stats = StatisticsAggregator::new(&mut single.store);

    assert_eq!(
        usage(&[("M16", 2), ("AK47", 1)]),
        stats
            .player_weapon_stats(single.current.id, single.roman.id)
            .unwrap()
    );
    assert!(stats
        .player_weapon_stats(single.current.id, single.nick.id)
        .unwrap()
        .is_empty());
    assert_eq!(
        None,
        stats.favorite_weapon(single.current.id, single.nick.id).unwrap()
    );
}

#[test]
fn unknown_match() {
    let mut store = MemoryStore::new();
    assert_eq!(
        None,
        StatisticsAggregator::new(&mut store)
            .match_statistics(model::MatchId(3))
            .unwrap()
    );
}

#[test]
fn match_overview_newest_first() {
    let mut store = MemoryStore::new();
    closed_match(&mut store, "old", "01/05/2020 10:00:00", "01/05/2020 10:30:00");
    store.create_match("new", at("03/05/2020 10:00:00")).unwrap();
    closed_match(&mut store, "mid", "02/05/2020 10:00:00", "02/05/2020 10:30:00");

    let overview = StatisticsAggregator::new(&mut store).match_overview().unwrap();

    let ids: Vec<_> = overview.iter().map(|m| m.match_id.as_str()).collect();
    assert_eq!(vec!["new", "mid", "old"], ids);
    assert!(overview[0].active);
    assert!(!overview[1].active);
    assert_eq!(0, overview[0].players);
}

#[test]
#[traced_test]
fn statistics_after_ingest() {
    let mut store = MemoryStore::new();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../testfiles/games.log");
    let content = std::fs::read_to_string(path).unwrap();
    LogIngestionEngine::default().ingest(&mut store, &content).unwrap();

    let mut stats = StatisticsAggregator::new(&mut store);
    let summary = stats.summary().unwrap();

    assert_eq!(3, summary.total_matches);
    assert_eq!(5, summary.total_players);
    assert_eq!(6, summary.total_kills);
    assert_eq!(9, summary.total_deaths);
    assert_eq!(2.0, summary.average_kills_per_match);
    assert_eq!(usage(&[("M16", 4), ("AK47", 2)]), summary.most_used_weapons);

    let names: Vec<_> = summary.top_players.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(vec!["Roman", "Marcus", "Bryan", "Nick", "John"], names);
    assert_eq!(3, summary.top_players[0].matches_won);

    let overview = stats.match_overview().unwrap();
    let ids: Vec<_> = overview.iter().map(|m| m.match_id.as_str()).collect();
    assert_eq!(vec!["11348966", "11348961", "11348965"], ids);
    assert_eq!(4, overview[1].players);
}
