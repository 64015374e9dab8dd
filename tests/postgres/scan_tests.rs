//! Keyset scan tests for the `PostgreSQL` repository.

use crate::postgres::helpers::{
    PostgresCluster, TestDatabase, change_status, described_entry, new_entry, postgres_cluster,
    test_runtime,
};
use chrono::{Duration, Utc};
use mcp_registry::server_registry::{
    adapters::postgres::PostgresServerEntryRepository,
    domain::{EntryStatus, ServerEntry},
    ports::{ScanHints, ServerEntryRepository},
};
use rstest::rstest;
use tokio::runtime::Runtime;

fn store(rt: &Runtime, repo: &PostgresServerEntryRepository, entries: &[ServerEntry]) {
    for entry in entries {
        rt.block_on(repo.create(entry)).expect("create");
    }
}

fn versions_of(entries: &[ServerEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.version().as_str()).collect()
}

#[rstest]
fn scan_resumes_after_cursor_in_id_order(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    let entries = ["1.0.0", "1.1.0", "1.2.0", "1.3.0", "1.4.0"]
        .into_iter()
        .map(|version| new_entry("io.example/weather", version).expect("entry"))
        .collect::<Vec<_>>();
    store(&rt, &repo, &entries);
    let cursor = entries.get(1).expect("second entry").id();

    let first_batch = rt
        .block_on(repo.scan(&ScanHints::default(), None, 2))
        .expect("first batch");
    let resumed = rt
        .block_on(repo.scan(&ScanHints::default(), Some(cursor), 10))
        .expect("resumed batch");

    assert_eq!(versions_of(&first_batch), vec!["1.0.0", "1.1.0"]);
    assert_eq!(versions_of(&resumed), vec!["1.2.0", "1.3.0", "1.4.0"]);
}

#[rstest]
fn scan_skips_deleted_entries(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    let mut entries = ["1.0.0", "2.0.0", "3.0.0"]
        .into_iter()
        .map(|version| new_entry("io.example/weather", version).expect("entry"))
        .collect::<Vec<_>>();
    store(&rt, &repo, &entries);
    let deprecated = entries.get_mut(0).expect("first entry");
    change_status(&rt, &repo, deprecated, EntryStatus::Deprecated).expect("deprecate");
    let deleted = entries.get_mut(1).expect("second entry");
    change_status(&rt, &repo, deleted, EntryStatus::Deleted).expect("delete");

    let scanned = rt
        .block_on(repo.scan(&ScanHints::default(), None, 10))
        .expect("scan");

    assert_eq!(versions_of(&scanned), vec!["1.0.0", "3.0.0"]);
}

#[rstest]
fn latest_only_hint_returns_flagged_entries(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    store(
        &rt,
        &repo,
        &[
            new_entry("io.example/weather", "1.0.0").expect("entry"),
            new_entry("io.example/weather", "2.0.0").expect("entry"),
            new_entry("io.example/maps", "0.3.0").expect("entry"),
        ],
    );
    let hints = ScanHints {
        latest_only: true,
        ..ScanHints::default()
    };

    let scanned = rt.block_on(repo.scan(&hints, None, 10)).expect("scan");

    assert_eq!(versions_of(&scanned), vec!["2.0.0", "0.3.0"]);
    assert!(scanned.iter().all(ServerEntry::is_latest));
}

#[rstest]
fn updated_since_hint_is_inclusive(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    let entry = new_entry("io.example/weather", "1.0.0").expect("entry");
    store(&rt, &repo, std::slice::from_ref(&entry));
    let stored_at = rt
        .block_on(repo.find_version(entry.name(), "1.0.0"))
        .expect("lookup")
        .expect("stored entry")
        .updated_at();

    let at_bound = ScanHints {
        updated_since: Some(stored_at),
        ..ScanHints::default()
    };
    let after_bound = ScanHints {
        updated_since: Some(Utc::now() + Duration::hours(1)),
        ..ScanHints::default()
    };

    let included = rt.block_on(repo.scan(&at_bound, None, 10)).expect("scan");
    let excluded = rt.block_on(repo.scan(&after_bound, None, 10)).expect("scan");

    assert_eq!(versions_of(&included), vec!["1.0.0"]);
    assert!(excluded.is_empty());
}

#[rstest]
#[case::name_match("weather", vec!["1.0.0"])]
#[case::description_match("forecast", vec!["1.0.0"])]
#[case::shared_suffix("example", vec!["1.0.0", "2.0.0"])]
#[case::no_match("tides", vec![])]
fn search_hint_matches_name_or_description_ignoring_ascii_case(
    postgres_cluster: PostgresCluster,
    #[case] needle: &str,
    #[case] expected: Vec<&str>,
) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    store(
        &rt,
        &repo,
        &[
            described_entry("io.example/WEATHER", "1.0.0", "Hourly FORECASTS").expect("entry"),
            described_entry("io.example/maps", "2.0.0", "Street maps").expect("entry"),
        ],
    );
    let hints = ScanHints {
        search: Some(needle.to_owned()),
        ..ScanHints::default()
    };

    let scanned = rt.block_on(repo.scan(&hints, None, 10)).expect("scan");

    assert_eq!(versions_of(&scanned), expected);
}

#[rstest]
#[case::percent("100%", vec!["1.0.0"])]
#[case::underscore("a_b", vec!["3.0.0"])]
#[case::backslash("c\\d", vec!["4.0.0"])]
fn search_hint_treats_wildcards_literally(
    postgres_cluster: PostgresCluster,
    #[case] needle: &str,
    #[case] expected: Vec<&str>,
) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let repo = db.repository(2).expect("repository");
    let rt = test_runtime().expect("tokio runtime");

    store(
        &rt,
        &repo,
        &[
            described_entry("io.example/uptime", "1.0.0", "Reports 100% uptime").expect("entry"),
            described_entry("io.example/ratio", "2.0.0", "Reports 1000 samples").expect("entry"),
            described_entry("io.example/snake", "3.0.0", "Reads a_b keys").expect("entry"),
            described_entry("io.example/paths", "4.0.0", "Reads c\\d paths").expect("entry"),
            described_entry("io.example/plain", "5.0.0", "Reads axb and cd").expect("entry"),
        ],
    );
    let hints = ScanHints {
        search: Some(needle.to_owned()),
        ..ScanHints::default()
    };

    let scanned = rt.block_on(repo.scan(&hints, None, 10)).expect("scan");

    assert_eq!(versions_of(&scanned), expected);
}
