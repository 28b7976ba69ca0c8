//! Runs against the empty database in `DATABASE_URL`, everything happens
//! inside a test transaction that is never committed.

use backend::{DbConnection, PgStore};
use diesel::Connection;
use fraglog::model::MatchId;
use fraglog::store::{KillFilter, KillRepository, MatchRepository, PlayerRepository, StoreError};
use fraglog::{LogIngestionEngine, StatisticsAggregator};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

const GAMES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../testfiles/games.log"));

fn connection() -> DbConnection {
    let database_url = std::env::var("DATABASE_URL").unwrap();
    let mut connection = backend::db_connection(&database_url).unwrap();
    backend::run_migrations(&mut connection).unwrap();
    connection.begin_test_transaction().unwrap();
    connection
}

#[test]
#[ignore = "Needs a postgres database"]
#[traced_test]
fn ingest_games() {
    let mut connection = connection();
    let engine = LogIngestionEngine::default();

    let report = backend::ingest(&mut connection, &engine, GAMES).unwrap();
    assert_eq!(15, report.processed);
    assert_eq!(None, report.errors);

    let mut store = PgStore::new(&mut connection);
    assert_eq!(3, store.list_matches().unwrap().len());
    assert_eq!(5, store.count_players().unwrap());
    assert_eq!(9, store.count_kills(KillFilter::default()).unwrap());
    assert_eq!(
        vec![("M16".to_owned(), 4), ("AK47".to_owned(), 2)],
        store.weapon_counts(KillFilter::player_kills()).unwrap()
    );

    assert_eq!(
        vec![("DROWN".to_owned(), 3)],
        store.weapon_counts(KillFilter::world_kills()).unwrap()
    );

    let roman = store.find_player_by_name("Roman").unwrap().unwrap();
    assert_eq!(
        vec![("M16".to_owned(), 4)],
        store
            .weapon_counts(KillFilter::player_kills().by_killer(roman.id))
            .unwrap()
    );
    assert_eq!(
        4,
        store
            .count_kills(KillFilter::default().by_killer(roman.id))
            .unwrap()
    );

    let summary = StatisticsAggregator::new(&mut store).summary().unwrap();
    assert_eq!(3, summary.total_matches);
    assert_eq!(6, summary.total_kills);
}

#[test]
#[ignore = "Needs a postgres database"]
#[traced_test]
fn rejected_document_leaves_nothing_behind() {
    let mut connection = connection();
    let engine = LogIngestionEngine::default();

    backend::ingest(&mut connection, &engine, GAMES).unwrap();

    let again = format!(
        "{}\n01/01/2022 10:00:00 - New match 42 has started\n01/01/2022 10:00:01 - A killed B using M16\n",
        GAMES
    );
    let err = backend::ingest(&mut connection, &engine, &again).unwrap_err();
    assert!(err.is_rejection());

    let mut store = PgStore::new(&mut connection);
    assert_eq!(None, store.find_match_by_external_id("42").unwrap());
    assert_eq!(None, store.find_player_by_name("a").unwrap());
}

#[test]
#[ignore = "Needs a postgres database"]
fn player_names_ignore_case() {
    let mut connection = connection();
    let mut store = PgStore::new(&mut connection);

    let roman = store.create_player(" Roman ").unwrap();
    assert_eq!("Roman", roman.name);
    assert_eq!(Some(roman.clone()), store.find_player_by_name("ROMAN").unwrap());
    assert!(matches!(
        store.create_player("roman"),
        Err(StoreError::UniqueViolation(_))
    ));
    // the transaction is still usable after the conflict
    assert_eq!(Some(roman.clone()), store.find_player(roman.id).unwrap());
}

#[test]
#[ignore = "Needs a postgres database"]
fn delete_cascades() {
    let mut connection = connection();
    let engine = LogIngestionEngine::default();
    backend::ingest(&mut connection, &engine, GAMES).unwrap();

    let mut store = PgStore::new(&mut connection);
    let first = store.find_match_by_external_id("11348965").unwrap().unwrap();

    assert!(store.delete_match(first.id).unwrap());
    assert!(!store.delete_match(first.id).unwrap());
    assert_eq!(0, store.count_kills(KillFilter::default().in_match(first.id)).unwrap());
    assert_eq!(7, store.count_kills(KillFilter::default()).unwrap());
    assert_eq!(None, store.find_match(MatchId(first.id.0)).unwrap());
}

#[test]
#[ignore = "Needs a postgres database"]
#[traced_test]
fn names_fold_case_like_the_unique_index() {
    let mut connection = connection();
    let engine = LogIngestionEngine::default();

    let log = "01/01/2022 10:00:00 - New match 77 has started\n01/01/2022 10:00:01 - ΟΔΟΣ killed Nick using M16\n01/01/2022 10:00:02 - Nick killed οδοσ using M16\n01/01/2022 10:00:03 - Match 77 has ended\n";
    let report = backend::ingest(&mut connection, &engine, log).unwrap();
    assert_eq!(4, report.processed);

    let mut store = PgStore::new(&mut connection);
    let odos = store.find_player_by_name("ΟΔΟΣ").unwrap().unwrap();
    assert_eq!("ΟΔΟΣ", odos.name);
    assert_eq!(Some(odos.clone()), store.find_player_by_name("οδοσ").unwrap());
    assert_eq!(2, store.count_players().unwrap());
}
