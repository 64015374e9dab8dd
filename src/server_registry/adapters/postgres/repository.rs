//! `PostgreSQL` repository implementation for server entry storage.
//!
//! Writes run in one transaction that first takes a transaction-scoped
//! advisory lock on the server name, then inserts or updates the row and
//! re-resolves the name's latest flag. Writers of one name are therefore
//! serialized across every process sharing the database, and a failure at
//! any step rolls the whole write back. Scans push the [`ScanHints`]
//! predicates into SQL and walk the table in `id` order so keyset cursors
//! map onto `id > $cursor`.

use super::{
    models::{NewServerEntryRow, ServerEntryRow},
    schema::server_entries,
};
use crate::server_registry::{
    domain::{
        EntryId, EntryStatus, Package, PersistedServerEntryData, RemoteTransport, ServerEntry,
        ServerManifest, ServerName, ServerVersion, resolve_latest, stale_latest_flags,
    },
    ports::{
        ScanHints, ServerEntryRepository, ServerEntryRepositoryError, ServerEntryRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;

/// `PostgreSQL` connection pool type used by server entry adapters.
pub type ServerEntryPgPool = Pool<ConnectionManager<PgConnection>>;

const NAME_VERSION_UNIQUE_INDEX: &str = "idx_server_entries_name_version";

/// `PostgreSQL`-backed server entry repository.
#[derive(Debug, Clone)]
pub struct PostgresServerEntryRepository {
    pool: ServerEntryPgPool,
}

impl PostgresServerEntryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ServerEntryPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ServerEntryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ServerEntryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(ServerEntryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ServerEntryRepositoryError::persistence)?
    }
}

impl From<DieselError> for ServerEntryRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl ServerEntryRepository for PostgresServerEntryRepository {
    async fn create(&self, entry: &ServerEntry) -> ServerEntryRepositoryResult<Option<EntryId>> {
        let entry_id = entry.id();
        let name = entry.name().clone();
        let version = entry.version().as_str().to_owned();
        let new_row = to_new_row(entry)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ServerEntryRepositoryError, _>(|tx_conn| {
                lock_name(tx_conn, &name)?;
                diesel::insert_into(server_entries::table)
                    .values(&new_row)
                    .execute(tx_conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if is_name_version_unique_violation(info.as_ref()) =>
                        {
                            ServerEntryRepositoryError::DuplicateVersion {
                                name: name.clone(),
                                version: version.clone(),
                            }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            ServerEntryRepositoryError::DuplicateEntry(entry_id)
                        }
                        _ => ServerEntryRepositoryError::persistence(err),
                    })?;
                refresh_latest(tx_conn, &name)
            })
        })
        .await
    }

    async fn update_status(
        &self,
        entry: &ServerEntry,
    ) -> ServerEntryRepositoryResult<Option<EntryId>> {
        let entry_id = entry.id();
        let name = entry.name().clone();
        let requested = entry.status();
        let updated_at = entry.updated_at();

        self.run_blocking(move |connection| {
            connection.transaction::<_, ServerEntryRepositoryError, _>(|tx_conn| {
                lock_name(tx_conn, &name)?;
                let persisted_status = server_entries::table
                    .filter(server_entries::id.eq(entry_id.into_inner()))
                    .filter(server_entries::name.eq(name.as_str()))
                    .select(server_entries::status)
                    .first::<String>(tx_conn)
                    .optional()?
                    .ok_or(ServerEntryRepositoryError::NotFound(entry_id))?;
                let stored = EntryStatus::try_from(persisted_status.as_str())
                    .map_err(ServerEntryRepositoryError::invalid_persisted_data)?;

                if !stored.can_transition_to(requested) {
                    return Err(ServerEntryRepositoryError::StatusConflict {
                        id: entry_id,
                        stored,
                        requested,
                    });
                }

                diesel::update(
                    server_entries::table.filter(server_entries::id.eq(entry_id.into_inner())),
                )
                .set((
                    server_entries::status.eq(requested.as_str()),
                    server_entries::updated_at.eq(updated_at),
                ))
                .execute(tx_conn)?;
                refresh_latest(tx_conn, &name)
            })
        })
        .await
    }

    async fn list_by_name(
        &self,
        name: &ServerName,
    ) -> ServerEntryRepositoryResult<Vec<ServerEntry>> {
        let lookup_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = server_entries::table
                .filter(server_entries::name.eq(lookup_name))
                .order(server_entries::id.asc())
                .select(ServerEntryRow::as_select())
                .load::<ServerEntryRow>(connection)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }

    async fn scan(
        &self,
        hints: &ScanHints,
        after: Option<EntryId>,
        batch_size: usize,
    ) -> ServerEntryRepositoryResult<Vec<ServerEntry>> {
        let scan_hints = hints.clone();
        let batch_limit = i64::try_from(batch_size).unwrap_or(i64::MAX);

        self.run_blocking(move |connection| {
            let mut query = server_entries::table
                .filter(server_entries::status.ne(EntryStatus::Deleted.as_str()))
                .into_boxed();

            if let Some(cursor) = after {
                query = query.filter(server_entries::id.gt(cursor.into_inner()));
            }
            if scan_hints.latest_only {
                query = query.filter(server_entries::is_latest.eq(true));
            }
            if let Some(since) = scan_hints.updated_since {
                query = query.filter(server_entries::updated_at.ge(since));
            }
            if let Some(search) = scan_hints.search.as_deref() {
                let pattern = like_pattern(search);
                query = query.filter(
                    server_entries::name
                        .ilike(pattern.clone())
                        .or(server_entries::description.ilike(pattern)),
                );
            }

            let rows = query
                .order(server_entries::id.asc())
                .limit(batch_limit)
                .select(ServerEntryRow::as_select())
                .load::<ServerEntryRow>(connection)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }

    async fn find_version(
        &self,
        name: &ServerName,
        version: &str,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>> {
        let lookup_name = name.as_str().to_owned();
        let lookup_version = version.to_owned();
        self.run_blocking(move |connection| {
            let row = server_entries::table
                .filter(server_entries::name.eq(lookup_name))
                .filter(server_entries::version.eq(lookup_version))
                .select(ServerEntryRow::as_select())
                .first::<ServerEntryRow>(connection)
                .optional()?;
            row.map(row_to_entry).transpose()
        })
        .await
    }

    async fn find_latest(
        &self,
        name: &ServerName,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>> {
        let lookup_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = server_entries::table
                .filter(server_entries::name.eq(lookup_name))
                .filter(server_entries::is_latest.eq(true))
                .select(ServerEntryRow::as_select())
                .first::<ServerEntryRow>(connection)
                .optional()?;
            row.map(row_to_entry).transpose()
        })
        .await
    }
}

/// Blocks until no other transaction writes `name`; released at commit.
fn lock_name(connection: &mut PgConnection, name: &ServerName) -> ServerEntryRepositoryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<Text, _>(name.as_str())
        .execute(connection)?;
    Ok(())
}

/// Re-resolves latest for `name`; callers hold the name's advisory lock.
fn refresh_latest(
    connection: &mut PgConnection,
    name: &ServerName,
) -> ServerEntryRepositoryResult<Option<EntryId>> {
    let entries = server_entries::table
        .filter(server_entries::name.eq(name.as_str()))
        .order(server_entries::id.asc())
        .select(ServerEntryRow::as_select())
        .load::<ServerEntryRow>(connection)?
        .into_iter()
        .map(row_to_entry)
        .collect::<ServerEntryRepositoryResult<Vec<_>>>()?;
    let winner = resolve_latest(&entries);
    if stale_latest_flags(&entries, winner).is_empty() {
        return Ok(winner);
    }

    // Clear first so the partial unique index never sees two flags.
    diesel::update(
        server_entries::table
            .filter(server_entries::name.eq(name.as_str()))
            .filter(server_entries::is_latest.eq(true)),
    )
    .set(server_entries::is_latest.eq(false))
    .execute(connection)?;

    if let Some(latest_id) = winner {
        diesel::update(
            server_entries::table.filter(server_entries::id.eq(latest_id.into_inner())),
        )
        .set(server_entries::is_latest.eq(true))
        .execute(connection)?;
    }
    Ok(winner)
}

fn to_new_row(entry: &ServerEntry) -> ServerEntryRepositoryResult<NewServerEntryRow> {
    let packages =
        serde_json::to_value(entry.packages()).map_err(ServerEntryRepositoryError::persistence)?;
    let remotes =
        serde_json::to_value(entry.remotes()).map_err(ServerEntryRepositoryError::persistence)?;

    Ok(NewServerEntryRow {
        id: entry.id().into_inner(),
        name: entry.name().as_str().to_owned(),
        version: entry.version().as_str().to_owned(),
        description: entry.description().to_owned(),
        packages,
        remotes,
        status: entry.status().as_str().to_owned(),
        is_latest: entry.is_latest(),
        published_at: entry.published_at(),
        updated_at: entry.updated_at(),
    })
}

fn row_to_entry(row: ServerEntryRow) -> ServerEntryRepositoryResult<ServerEntry> {
    let ServerEntryRow {
        id,
        name: persisted_name,
        version: persisted_version,
        description,
        packages: persisted_packages,
        remotes: persisted_remotes,
        status: persisted_status,
        is_latest,
        published_at,
        updated_at,
    } = row;

    let name =
        ServerName::new(persisted_name).map_err(ServerEntryRepositoryError::invalid_persisted_data)?;
    let version = ServerVersion::parse(persisted_version)
        .map_err(ServerEntryRepositoryError::invalid_persisted_data)?;
    let packages = serde_json::from_value::<Vec<Package>>(persisted_packages)
        .map_err(ServerEntryRepositoryError::invalid_persisted_data)?;
    let remotes = serde_json::from_value::<Vec<RemoteTransport>>(persisted_remotes)
        .map_err(ServerEntryRepositoryError::invalid_persisted_data)?;
    let status = EntryStatus::try_from(persisted_status.as_str())
        .map_err(ServerEntryRepositoryError::invalid_persisted_data)?;
    let manifest = ServerManifest::new(name, version, description)
        .map_err(ServerEntryRepositoryError::invalid_persisted_data)?
        .with_packages(packages)
        .with_remotes(remotes);

    Ok(ServerEntry::from_persisted(PersistedServerEntryData {
        id: EntryId::from_uuid(id),
        manifest,
        status,
        published_at,
        updated_at,
        is_latest,
    }))
}

fn is_name_version_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|constraint| constraint == NAME_VERSION_UNIQUE_INDEX)
}

/// Builds an `ILIKE` pattern matching `search` as a literal substring.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
