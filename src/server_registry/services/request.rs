//! Request payloads accepted by the registry service.

use crate::server_registry::domain::{
    Package, RegistryDomainError, RemoteTransport, ServerManifest, ServerName, ServerVersion,
};

/// Request payload for publishing one server version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishServerRequest {
    name: String,
    version: String,
    description: String,
    packages: Vec<Package>,
    remotes: Vec<RemoteTransport>,
}

impl PublishServerRequest {
    /// Creates a request with the required manifest fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            packages: Vec::new(),
            remotes: Vec::new(),
        }
    }

    /// Sets package distributions.
    #[must_use]
    pub fn with_packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        self.packages = packages.into_iter().collect();
        self
    }

    /// Sets remote distributions.
    #[must_use]
    pub fn with_remotes(mut self, remotes: impl IntoIterator<Item = RemoteTransport>) -> Self {
        self.remotes = remotes.into_iter().collect();
        self
    }

    /// Validates the request into a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the name, version, or description
    /// is invalid.
    pub fn into_manifest(self) -> Result<ServerManifest, RegistryDomainError> {
        let name = ServerName::new(self.name)?;
        let version = ServerVersion::parse(self.version)?;
        Ok(ServerManifest::new(name, version, self.description)?
            .with_packages(self.packages)
            .with_remotes(self.remotes))
    }
}

/// Raw listing query as received from the transport layer.
///
/// Every field is optional; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServersRequest {
    search: Option<String>,
    server_type: Option<String>,
    version: Option<String>,
    updated_since: Option<String>,
    limit: Option<i64>,
    cursor: Option<String>,
}

impl ListServersRequest {
    /// Creates an unfiltered first-page request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the case-insensitive search text.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the distribution type filter (`remote`, `npm`, ...).
    #[must_use]
    pub fn with_type(mut self, server_type: impl Into<String>) -> Self {
        self.server_type = Some(server_type.into());
        self
    }

    /// Sets the version selector (`latest` or an exact version).
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the RFC 3339 `updated_since` lower bound.
    #[must_use]
    pub fn with_updated_since(mut self, updated_since: impl Into<String>) -> Self {
        self.updated_since = Some(updated_since.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the continuation cursor from a previous page.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Returns the search text.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the distribution type filter.
    #[must_use]
    pub fn server_type(&self) -> Option<&str> {
        self.server_type.as_deref()
    }

    /// Returns the version selector.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the raw `updated_since` bound.
    #[must_use]
    pub fn updated_since(&self) -> Option<&str> {
        self.updated_since.as_deref()
    }

    /// Returns the requested page size.
    #[must_use]
    pub const fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// Returns the continuation cursor, ignoring a blank one.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor
            .as_deref()
            .filter(|cursor| !cursor.trim().is_empty())
    }
}
