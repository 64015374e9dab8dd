//! Registry facade: publishing, status changes, listings, and lookups.
//!
//! Every mutation of a name's version set is handed to the repository, which
//! re-resolves the materialized latest flag in the same atomic step, so at
//! most one non-deleted entry per name is ever flagged latest and a failed
//! write changes nothing. The per-name lock additionally orders writers
//! within one process. Listing validates the whole query before touching
//! storage, then walks storage in entry-id order and re-applies the full
//! filter to every row.

use super::{
    ListServersRequest, ListingConfig, NameLocks, PublishServerRequest, RegistryServiceError,
    RegistryServiceResult, ServerListing,
};
use crate::server_registry::{
    domain::{
        EntryStatus, ListingFilter, ListingQueryError, PageCollector, PageCursor, PageLimit,
        ServerEntry, ServerName, VersionSelector,
    },
    ports::{ScanHints, ServerEntryRepository},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry orchestration service.
#[derive(Clone)]
pub struct ServerRegistryService<R, C>
where
    R: ServerEntryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: ListingConfig,
    locks: Arc<NameLocks>,
}

impl<R, C> ServerRegistryService<R, C>
where
    R: ServerEntryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a registry service with the default listing configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            config: ListingConfig::default(),
            locks: Arc::new(NameLocks::new()),
        }
    }

    /// Replaces the listing configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ListingConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the listing configuration.
    #[must_use]
    pub const fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// Publishes a new server version and recomputes latest for its name.
    ///
    /// The manifest is validated before any storage access.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Domain`] when the manifest is invalid
    /// and [`RegistryServiceError::Repository`] when the version already
    /// exists or persistence fails.
    pub async fn publish(&self, request: PublishServerRequest) -> RegistryServiceResult<ServerEntry> {
        let manifest = request.into_manifest()?;
        let mut entry = ServerEntry::new(manifest, &*self.clock);

        let _guard = self.locks.acquire(entry.name()).await;
        let latest = self.repository.create(&entry).await?;
        entry.mark_latest(latest == Some(entry.id()));
        debug!(server = %entry.name(), latest = ?latest, "resolved latest server version");

        info!(
            server = %entry.name(),
            version = %entry.version(),
            entry_id = %entry.id(),
            is_latest = entry.is_latest(),
            "published server version"
        );
        Ok(entry)
    }

    /// Moves one version along the `active -> deprecated -> deleted`
    /// lifecycle and recomputes latest for its name.
    ///
    /// Re-applying the current status returns the entry unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] when the version does not
    /// exist, [`RegistryServiceError::Domain`] for an invalid name or a
    /// backwards transition, and [`RegistryServiceError::Repository`] when
    /// persistence fails.
    pub async fn update_status(
        &self,
        name: &str,
        version: &str,
        status: EntryStatus,
    ) -> RegistryServiceResult<ServerEntry> {
        let server_name = ServerName::new(name)?;

        let _guard = self.locks.acquire(&server_name).await;
        let mut entry = self
            .repository
            .find_version(&server_name, version)
            .await?
            .ok_or_else(|| RegistryServiceError::not_found(server_name.as_str(), Some(version)))?;

        let previous = entry.status();
        if !entry.change_status(status, &*self.clock)? {
            return Ok(entry);
        }

        let latest = self.repository.update_status(&entry).await?;
        entry.mark_latest(latest == Some(entry.id()));
        debug!(server = %server_name, latest = ?latest, "resolved latest server version");

        info!(
            server = %server_name,
            version = %entry.version(),
            from = previous.as_str(),
            to = status.as_str(),
            "changed server version status"
        );
        Ok(entry)
    }

    /// Lists entries matching the request, one page at a time.
    ///
    /// Filters, limit, and cursor are all validated before storage is
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Query`] for an unknown type, a
    /// malformed timestamp, a foreign cursor, or an out-of-range limit, and
    /// [`RegistryServiceError::Repository`] when scanning fails.
    pub async fn list_servers(
        &self,
        request: &ListServersRequest,
    ) -> RegistryServiceResult<ServerListing> {
        let (filter, limit, cursor) = self.parse_listing(request).inspect_err(|err| {
            warn!(error = %err, "rejected listing query");
        })?;

        let hints = ScanHints::from(&filter);
        let batch_size = self.config.scan_batch_size();
        let mut collector = PageCollector::new(limit);
        let mut position = cursor.map(PageCursor::position);
        let mut scanned = 0_usize;

        'scan: loop {
            let batch = self.repository.scan(&hints, position, batch_size).await?;
            let exhausted = batch.len() < batch_size;
            scanned += batch.len();

            for entry in batch {
                position = Some(entry.id());
                if filter.matches(&entry) && collector.offer(entry) {
                    break 'scan;
                }
            }

            if exhausted {
                break;
            }
        }

        let page = collector.finish();
        debug!(
            limit = limit.get(),
            scanned,
            returned = page.count(),
            has_more = page.next_cursor().is_some(),
            "listed server window"
        );
        Ok(ServerListing::from(page))
    }

    /// Resolves one version of a server; `latest` selects the flagged entry.
    ///
    /// Exact versions are matched byte-for-byte, build metadata included, and
    /// resolve deleted entries too.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] when nothing matches,
    /// [`RegistryServiceError::Domain`] for an invalid name, and
    /// [`RegistryServiceError::Repository`] when lookup fails.
    pub async fn get_server(&self, name: &str, version: &str) -> RegistryServiceResult<ServerEntry> {
        let server_name = ServerName::new(name)?;
        let found = match VersionSelector::parse(version) {
            VersionSelector::Latest => self.repository.find_latest(&server_name).await?,
            VersionSelector::Exact(exact) => {
                self.repository.find_version(&server_name, &exact).await?
            }
        };

        found.ok_or_else(|| RegistryServiceError::not_found(server_name.as_str(), Some(version)))
    }

    /// Lists every non-deleted version of a server in publication order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] when the name has no
    /// listed version, [`RegistryServiceError::Domain`] for an invalid name,
    /// and [`RegistryServiceError::Repository`] when lookup fails.
    pub async fn list_versions(&self, name: &str) -> RegistryServiceResult<ServerListing> {
        let server_name = ServerName::new(name)?;
        let versions: Vec<ServerEntry> = self
            .repository
            .list_by_name(&server_name)
            .await?
            .into_iter()
            .filter(|entry| entry.status().is_listed())
            .collect();

        if versions.is_empty() {
            return Err(RegistryServiceError::not_found(server_name.as_str(), None));
        }
        Ok(ServerListing::complete(versions))
    }

    fn parse_listing(
        &self,
        request: &ListServersRequest,
    ) -> Result<(ListingFilter, PageLimit, Option<PageCursor>), ListingQueryError> {
        let filter = ListingFilter::parse(
            request.search(),
            request.server_type(),
            request.version(),
            request.updated_since(),
        )?;
        let limit = PageLimit::new(
            request
                .limit()
                .unwrap_or_else(|| i64::from(self.config.default_page_size())),
        )?;
        let cursor = request.cursor().map(PageCursor::decode).transpose()?;
        Ok((filter, limit, cursor))
    }
}
