//! Repository contract tests for the in-memory adapter.

use super::helpers::{new_entry, repo};
use mcp_registry::server_registry::{
    adapters::memory::InMemoryServerEntryRepository,
    domain::{EntryStatus, ServerName},
    ports::{ScanHints, ServerEntryRepository, ServerEntryRepositoryError},
};
use mockable::DefaultClock;
use rstest::rstest;

fn name(raw: &str) -> Result<ServerName, eyre::Report> {
    Ok(ServerName::new(raw)?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_exact_version_is_rejected(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    repo.create(&new_entry("io.example/weather", "1.0.0")?).await?;

    let result = repo.create(&new_entry("io.example/weather", "1.0.0")?).await;
    eyre::ensure!(
        matches!(
            result,
            Err(ServerEntryRepositoryError::DuplicateVersion { ref version, .. }) if version == "1.0.0"
        ),
        "expected duplicate version, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn build_metadata_variants_are_distinct_rows(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    repo.create(&new_entry("io.example/weather", "1.0.0")?).await?;
    repo.create(&new_entry("io.example/weather", "1.0.0+build.1")?)
        .await?;

    let rows = repo.list_by_name(&name("io.example/weather")?).await?;
    eyre::ensure!(rows.len() == 2, "expected two rows, found {}", rows.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_version_under_other_name_is_allowed(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    repo.create(&new_entry("io.example/weather", "1.0.0")?).await?;
    repo.create(&new_entry("io.example/maps", "1.0.0")?).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_identifier_is_rejected(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let entry = new_entry("io.example/weather", "1.0.0")?;
    repo.create(&entry).await?;

    let result = repo.create(&entry).await;
    eyre::ensure!(
        matches!(result, Err(ServerEntryRepositoryError::DuplicateEntry(id)) if id == entry.id()),
        "expected duplicate entry, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_duplicate_leaves_latest_untouched(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let original = new_entry("io.example/weather", "2.0.0")?;
    repo.create(&original).await?;

    let result = repo.create(&new_entry("io.example/weather", "2.0.0")?).await;
    eyre::ensure!(result.is_err(), "duplicate accepted");

    let rows = repo.list_by_name(original.name()).await?;
    eyre::ensure!(rows.len() == 1, "rejected row was stored");
    let latest = repo.find_latest(original.name()).await?;
    eyre::ensure!(
        latest.map(|row| row.id()) == Some(original.id()),
        "latest flag moved on a failed create"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_status_preserves_latest_flag(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let mut entry = new_entry("io.example/weather", "1.0.0")?;
    let created_latest = repo.create(&entry).await?;
    eyre::ensure!(created_latest == Some(entry.id()), "first version not latest");

    entry.change_status(EntryStatus::Deprecated, &DefaultClock)?;
    let updated_latest = repo.update_status(&entry).await?;
    eyre::ensure!(updated_latest == Some(entry.id()), "deprecation moved latest");

    let stored = repo
        .find_version(entry.name(), "1.0.0")
        .await?
        .ok_or_else(|| eyre::eyre!("stored entry missing"))?;
    eyre::ensure!(stored.status() == EntryStatus::Deprecated, "status not persisted");
    eyre::ensure!(stored.is_latest(), "latest flag lost on status update");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_status_of_unknown_entry_is_not_found(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let entry = new_entry("io.example/weather", "1.0.0")?;
    let result = repo.update_status(&entry).await;
    eyre::ensure!(
        matches!(result, Err(ServerEntryRepositoryError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_status_update_is_a_conflict(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let entry = new_entry("io.example/weather", "1.0.0")?;
    repo.create(&entry).await?;

    let mut deleted = entry.clone();
    deleted.change_status(EntryStatus::Deleted, &DefaultClock)?;
    repo.update_status(&deleted).await?;

    let mut stale = entry;
    stale.change_status(EntryStatus::Deprecated, &DefaultClock)?;
    let result = repo.update_status(&stale).await;
    eyre::ensure!(
        matches!(
            result,
            Err(ServerEntryRepositoryError::StatusConflict {
                stored: EntryStatus::Deleted,
                requested: EntryStatus::Deprecated,
                ..
            })
        ),
        "expected status conflict, got {result:?}"
    );

    let stored = repo
        .find_version(stale.name(), "1.0.0")
        .await?
        .ok_or_else(|| eyre::eyre!("stored entry missing"))?;
    eyre::ensure!(stored.status() == EntryStatus::Deleted, "stale write applied");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_resolves_latest_only_within_its_name(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let maps = new_entry("io.example/maps", "1.0.0")?;
    let weather_new = new_entry("io.example/weather", "2.0.0")?;
    let weather_old = new_entry("io.example/weather", "1.0.0")?;
    repo.create(&maps).await?;
    repo.create(&weather_new).await?;
    let resolved = repo.create(&weather_old).await?;
    eyre::ensure!(resolved == Some(weather_new.id()), "backport took latest");

    let weather_rows = repo.list_by_name(weather_new.name()).await?;
    let flagged: Vec<_> = weather_rows
        .iter()
        .filter(|row| row.is_latest())
        .map(|row| row.id())
        .collect();
    eyre::ensure!(flagged == [weather_new.id()], "expected only 2.0.0 flagged");

    let maps_latest = repo.find_latest(maps.name()).await?;
    eyre::ensure!(
        maps_latest.map(|row| row.id()) == Some(maps.id()),
        "other name lost its latest flag"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_only_version_clears_latest(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let mut entry = new_entry("io.example/weather", "1.0.0")?;
    repo.create(&entry).await?;

    entry.change_status(EntryStatus::Deleted, &DefaultClock)?;
    let resolved = repo.update_status(&entry).await?;

    eyre::ensure!(resolved.is_none(), "deleted entry resolved as latest");
    eyre::ensure!(
        repo.find_latest(entry.name()).await?.is_none(),
        "latest flag should be cleared"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_walks_identifier_order_after_cursor(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let mut created = Vec::new();
    for index in 0..5 {
        let entry = new_entry(&format!("io.example/server-{index}"), "1.0.0")?;
        repo.create(&entry).await?;
        created.push(entry.id());
    }
    let hints = ScanHints::default();

    let first = repo.scan(&hints, None, 2).await?;
    let first_ids: Vec<_> = first.iter().map(|entry| entry.id()).collect();
    eyre::ensure!(first_ids == created[..2], "first batch out of order");

    let rest = repo.scan(&hints, first_ids.last().copied(), 10).await?;
    let rest_ids: Vec<_> = rest.iter().map(|entry| entry.id()).collect();
    eyre::ensure!(rest_ids == created[2..], "resumed batch out of order");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_skips_deleted_and_applies_hints(
    repo: InMemoryServerEntryRepository,
) -> Result<(), eyre::Report> {
    let mut deleted = new_entry("io.example/gone", "1.0.0")?;
    let flagged = new_entry("io.example/kept", "1.0.0")?;
    let unflagged = new_entry("io.example/kept", "0.9.0")?;
    for entry in [&deleted, &flagged, &unflagged] {
        repo.create(entry).await?;
    }
    deleted.change_status(EntryStatus::Deleted, &DefaultClock)?;
    repo.update_status(&deleted).await?;

    let everything = repo.scan(&ScanHints::default(), None, 10).await?;
    eyre::ensure!(everything.len() == 2, "deleted row leaked into scan");

    let latest_only = ScanHints {
        latest_only: true,
        ..ScanHints::default()
    };
    let latest = repo.scan(&latest_only, None, 10).await?;
    eyre::ensure!(
        latest.iter().map(|entry| entry.id()).eq([flagged.id()]),
        "latest-only hint ignored"
    );

    let future_only = ScanHints {
        updated_since: Some(flagged.updated_at() + chrono::Duration::days(1)),
        ..ScanHints::default()
    };
    eyre::ensure!(
        repo.scan(&future_only, None, 10).await?.is_empty(),
        "updated_since hint ignored"
    );
    Ok(())
}
