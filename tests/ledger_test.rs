//! Tests for the stats ledger in isolation.

use tempfile::NamedTempFile;

use versus::{MatchStore, Outcome, StatsLedger};

/// Opens a store (to apply migrations) and returns a standalone ledger
/// over the same database file.
fn setup_test_ledger() -> (NamedTempFile, StatsLedger) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    MatchStore::open(db_path.clone()).expect("Failed to open store");
    (db_file, StatsLedger::new(db_path))
}

#[test]
fn test_record_creates_participant_lazily() {
    let (_db, ledger) = setup_test_ledger();
    assert!(ledger.get(42).expect("Get failed").is_none());

    ledger.record_result(42, Outcome::Win).expect("Record failed");

    let stats = ledger.get(42).expect("Get failed").expect("Missing");
    assert_eq!(*stats.participant_id(), 42);
    assert_eq!(*stats.games_played(), 1);
    assert_eq!(*stats.wins(), 1);
    assert_eq!(*stats.losses(), 0);
    assert_eq!(*stats.draws(), 0);
}

#[test]
fn test_results_accumulate() {
    let (_db, ledger) = setup_test_ledger();

    for outcome in [Outcome::Win, Outcome::Loss, Outcome::Draw, Outcome::Win] {
        ledger.record_result(42, outcome).expect("Record failed");
    }

    let stats = ledger.get(42).expect("Get failed").expect("Missing");
    assert_eq!(*stats.games_played(), 4);
    assert_eq!(*stats.wins(), 2);
    assert_eq!(*stats.losses(), 1);
    assert_eq!(*stats.draws(), 1);
    assert_eq!(
        *stats.games_played(),
        stats.wins() + stats.losses() + stats.draws()
    );
}

#[test]
fn test_participants_are_independent() {
    let (_db, ledger) = setup_test_ledger();

    ledger.record_result(42, Outcome::Win).expect("Record failed");
    ledger.record_result(7, Outcome::Loss).expect("Record failed");

    let first = ledger.get(42).expect("Get failed").expect("Missing");
    assert_eq!(*first.wins(), 1);
    assert_eq!(*first.losses(), 0);

    let second = ledger.get(7).expect("Get failed").expect("Missing");
    assert_eq!(*second.wins(), 0);
    assert_eq!(*second.losses(), 1);
}

#[test]
fn test_win_rate() {
    let (_db, ledger) = setup_test_ledger();

    for outcome in [Outcome::Win, Outcome::Win, Outcome::Loss, Outcome::Draw] {
        ledger.record_result(42, outcome).expect("Record failed");
    }

    let stats = ledger.get(42).expect("Get failed").expect("Missing");
    assert!((stats.win_rate() - 50.0).abs() < f64::EPSILON);
}
