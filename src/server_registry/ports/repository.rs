//! Repository port for server entry persistence, lookup, and scanning.

use crate::server_registry::domain::{
    EntryId, EntryStatus, ListingFilter, SearchText, ServerEntry, ServerName, VersionSelector,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for server entry repository operations.
pub type ServerEntryRepositoryResult<T> = Result<T, ServerEntryRepositoryError>;

/// Cheap predicates a repository may push down while scanning.
///
/// Deleted entries are never returned by a scan. Adapters may ignore any
/// hint they cannot evaluate cheaply; callers re-apply the full
/// [`ListingFilter`] to every row regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanHints {
    /// Only entries flagged latest.
    pub latest_only: bool,
    /// Inclusive lower bound on `updated_at`.
    pub updated_since: Option<DateTime<Utc>>,
    /// Lowercased substring expected in the name or description.
    ///
    /// Only ASCII needles are carried here: `SQL` case folding of non-ASCII
    /// text depends on collation and may disagree with the full filter.
    pub search: Option<String>,
}

impl From<&ListingFilter> for ScanHints {
    fn from(filter: &ListingFilter) -> Self {
        Self {
            latest_only: matches!(filter.version(), Some(VersionSelector::Latest)),
            updated_since: filter.updated_since(),
            search: filter
                .search()
                .map(SearchText::as_str)
                .filter(|needle| needle.is_ascii())
                .map(str::to_owned),
        }
    }
}

/// Server entry persistence contract.
///
/// Writes that change a name's version set also re-resolve that name's
/// latest entry in the same atomic step, serialized against every other
/// writer of the name sharing the store. A failed write leaves neither the
/// row nor any latest flag changed.
#[async_trait]
pub trait ServerEntryRepository: Send + Sync {
    /// Stores a newly published entry and re-resolves latest for its name.
    ///
    /// Returns the identifier of the name's latest entry after the insert.
    ///
    /// # Errors
    ///
    /// Returns [`ServerEntryRepositoryError::DuplicateVersion`] when the name
    /// already has an entry with the exact same version string, or
    /// [`ServerEntryRepositoryError::DuplicateEntry`] when the identifier is
    /// taken.
    async fn create(&self, entry: &ServerEntry) -> ServerEntryRepositoryResult<Option<EntryId>>;

    /// Persists the status and `updated_at` of an existing entry and
    /// re-resolves latest for its name.
    ///
    /// Returns the identifier of the name's latest entry after the update.
    ///
    /// # Errors
    ///
    /// Returns [`ServerEntryRepositoryError::NotFound`] when the entry does
    /// not exist and [`ServerEntryRepositoryError::StatusConflict`] when the
    /// stored status cannot move to the new one.
    async fn update_status(
        &self,
        entry: &ServerEntry,
    ) -> ServerEntryRepositoryResult<Option<EntryId>>;

    /// Returns every entry of `name`, all statuses, in identifier order.
    async fn list_by_name(&self, name: &ServerName)
    -> ServerEntryRepositoryResult<Vec<ServerEntry>>;

    /// Returns up to `batch_size` non-deleted entries with identifiers
    /// greater than `after`, in identifier order.
    async fn scan(
        &self,
        hints: &ScanHints,
        after: Option<EntryId>,
        batch_size: usize,
    ) -> ServerEntryRepositoryResult<Vec<ServerEntry>>;

    /// Finds the entry of `name` whose version string equals `version`
    /// exactly, whatever its status.
    async fn find_version(
        &self,
        name: &ServerName,
        version: &str,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>>;

    /// Finds the entry of `name` currently flagged latest.
    async fn find_latest(
        &self,
        name: &ServerName,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>>;
}

/// Errors returned by server entry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ServerEntryRepositoryError {
    /// The name already has an entry with this exact version string.
    #[error("duplicate version {version} for server {name}")]
    DuplicateVersion {
        /// Server name.
        name: ServerName,
        /// Exact version string.
        version: String,
    },

    /// An entry with the same identifier already exists.
    #[error("duplicate entry identifier: {0}")]
    DuplicateEntry(EntryId),

    /// The entry was not found.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// The stored status no longer allows the requested transition.
    #[error("entry {id} is {stored} and cannot become {requested}")]
    StatusConflict {
        /// Entry identifier.
        id: EntryId,
        /// Status currently stored.
        stored: EntryStatus,
        /// Status the caller asked for.
        requested: EntryStatus,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted entry data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ServerEntryRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
