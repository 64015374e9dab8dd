//! Server entry aggregate root: one persisted `(name, version)` record.

use super::{
    EntryId, EntryStatus, Package, RegistryDomainError, RegistryType, RemoteTransport, ServerName,
    ServerVersion,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Publisher-supplied content of one server version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerManifest {
    name: ServerName,
    version: ServerVersion,
    description: String,
    #[serde(default)]
    packages: Vec<Package>,
    #[serde(default)]
    remotes: Vec<RemoteTransport>,
}

impl ServerManifest {
    /// Creates a manifest without distributions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyDescription`] when the description
    /// is blank.
    pub fn new(
        name: ServerName,
        version: ServerVersion,
        raw_description: impl Into<String>,
    ) -> Result<Self, RegistryDomainError> {
        let description = raw_description.into().trim().to_owned();
        if description.is_empty() {
            return Err(RegistryDomainError::EmptyDescription);
        }

        Ok(Self {
            name,
            version,
            description,
            packages: Vec::new(),
            remotes: Vec::new(),
        })
    }

    /// Replaces the package distributions, keeping their order.
    #[must_use]
    pub fn with_packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        self.packages = packages.into_iter().collect();
        self
    }

    /// Replaces the remote distributions, keeping their order.
    #[must_use]
    pub fn with_remotes(mut self, remotes: impl IntoIterator<Item = RemoteTransport>) -> Self {
        self.remotes = remotes.into_iter().collect();
        self
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> &ServerVersion {
        &self.version
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the package distributions.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Returns the remote distributions.
    #[must_use]
    pub fn remotes(&self) -> &[RemoteTransport] {
        &self.remotes
    }
}

/// Server entry aggregate root.
///
/// `is_latest` is a materialized flag. It is only ever written by latest
/// resolution for the entry's name, never by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    id: EntryId,
    #[serde(flatten)]
    manifest: ServerManifest,
    status: EntryStatus,
    published_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_latest: bool,
}

/// Parameter object for reconstructing a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedServerEntryData {
    /// Persisted entry identifier.
    pub id: EntryId,
    /// Persisted manifest.
    pub manifest: ServerManifest,
    /// Persisted lifecycle status.
    pub status: EntryStatus,
    /// Persisted publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Persisted last-mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted latest flag.
    pub is_latest: bool,
}

impl ServerEntry {
    /// Creates a newly published, `Active` entry that is not yet latest.
    #[must_use]
    pub fn new(manifest: ServerManifest, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: EntryId::new(),
            manifest,
            status: EntryStatus::Active,
            published_at: timestamp,
            updated_at: timestamp,
            is_latest: false,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedServerEntryData) -> Self {
        Self {
            id: data.id,
            manifest: data.manifest,
            status: data.status,
            published_at: data.published_at,
            updated_at: data.updated_at,
            is_latest: data.is_latest,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Returns the published manifest.
    #[must_use]
    pub const fn manifest(&self) -> &ServerManifest {
        &self.manifest
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        self.manifest.name()
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> &ServerVersion {
        self.manifest.version()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.manifest.description()
    }

    /// Returns the package distributions.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        self.manifest.packages()
    }

    /// Returns the remote distributions.
    #[must_use]
    pub fn remotes(&self) -> &[RemoteTransport] {
        self.manifest.remotes()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        self.status
    }

    /// Returns the publication timestamp.
    #[must_use]
    pub const fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// Returns the last-mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this entry is the latest version of its name.
    #[must_use]
    pub const fn is_latest(&self) -> bool {
        self.is_latest
    }

    /// Returns whether the entry offers at least one hosted remote.
    #[must_use]
    pub fn has_remotes(&self) -> bool {
        !self.remotes().is_empty()
    }

    /// Returns whether any package is published to `registry_type`.
    #[must_use]
    pub fn has_package_in(&self, registry_type: RegistryType) -> bool {
        self.packages()
            .iter()
            .any(|package| package.registry_type() == registry_type)
    }

    /// Moves the entry to `target`, returning whether anything changed.
    ///
    /// Re-applying the current status is a no-op that leaves `updated_at`
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidStatusTransition`] when `target`
    /// lies behind the current status.
    pub fn change_status(
        &mut self,
        target: EntryStatus,
        clock: &impl Clock,
    ) -> Result<bool, RegistryDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(RegistryDomainError::InvalidStatusTransition {
                from: self.status.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }

        if self.status == target {
            return Ok(false);
        }

        self.status = target;
        self.touch(clock);
        Ok(true)
    }

    /// Sets the materialized latest flag.
    pub const fn mark_latest(&mut self, is_latest: bool) {
        self.is_latest = is_latest;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
