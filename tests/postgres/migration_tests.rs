//! Schema tests for the `server_entries` migration.

use crate::postgres::helpers::{
    PostgresCluster, TestDatabase, flagged_versions, postgres_cluster,
};
use diesel::prelude::*;
use diesel::sql_types::Text;
use rstest::rstest;

#[derive(QueryableByName)]
struct IndexName {
    #[diesel(sql_type = Text)]
    indexname: String,
}

fn raw_insert(
    conn: &mut PgConnection,
    name: &str,
    version: &str,
    status: &str,
    latest: bool,
) -> QueryResult<usize> {
    diesel::sql_query(concat!(
        "INSERT INTO server_entries ",
        "(id, name, version, description, status, is_latest, published_at, updated_at) ",
        "VALUES ($1, $2, $3, 'schema row', $4, $5, now(), now())",
    ))
    .bind::<diesel::sql_types::Uuid, _>(uuid::Uuid::now_v7())
    .bind::<Text, _>(name)
    .bind::<Text, _>(version)
    .bind::<Text, _>(status)
    .bind::<diesel::sql_types::Bool, _>(latest)
    .execute(conn)
}

#[rstest]
fn migration_creates_lookup_indexes(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let mut conn = db.connect().expect("connection");

    let indexes = diesel::sql_query(
        "SELECT indexname FROM pg_indexes WHERE tablename = 'server_entries' ORDER BY indexname",
    )
    .load::<IndexName>(&mut conn)
    .expect("index listing")
    .into_iter()
    .map(|row| row.indexname)
    .collect::<Vec<_>>();

    for expected in [
        "idx_server_entries_latest_per_name",
        "idx_server_entries_name_version",
        "idx_server_entries_updated_at",
    ] {
        assert!(
            indexes.iter().any(|name| name == expected),
            "missing index {expected}, found {indexes:?}"
        );
    }
}

#[rstest]
fn partial_index_allows_one_latest_per_name(postgres_cluster: PostgresCluster) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let mut conn = db.connect().expect("connection");

    raw_insert(&mut conn, "io.example/weather", "1.0.0", "active", true).expect("first latest");
    raw_insert(&mut conn, "io.example/weather", "0.9.0", "active", false).expect("non-latest row");
    raw_insert(&mut conn, "io.example/maps", "1.0.0", "active", true)
        .expect("latest under another name");

    let second = raw_insert(&mut conn, "io.example/weather", "2.0.0", "active", true);

    assert!(second.is_err(), "second latest row for one name was accepted");
    assert_eq!(
        flagged_versions(&mut conn, "io.example/weather").expect("flag query"),
        vec!["1.0.0".to_owned()]
    );
}

#[rstest]
#[case::active("active", true)]
#[case::deprecated("deprecated", true)]
#[case::deleted("deleted", true)]
#[case::unknown("archived", false)]
#[case::uppercase("ACTIVE", false)]
fn status_column_accepts_only_lifecycle_values(
    postgres_cluster: PostgresCluster,
    #[case] status: &str,
    #[case] accepted: bool,
) {
    let db = TestDatabase::create(postgres_cluster).expect("test database");
    let mut conn = db.connect().expect("connection");

    let result = raw_insert(&mut conn, "io.example/weather", "1.0.0", status, false);

    assert_eq!(result.is_ok(), accepted, "status {status}: {result:?}");
}
