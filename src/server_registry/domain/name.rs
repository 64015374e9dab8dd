//! Validated namespaced server name type.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a server name, matching the `VARCHAR(200)` column.
const MAX_NAME_LENGTH: usize = 200;

/// Validated `<namespace>/<slug>` server name (e.g. `io.github.acme/weather`).
///
/// The namespace is a reverse-DNS-like prefix of `[A-Za-z0-9.-]`; the slug
/// additionally allows underscores. Case is preserved. Namespace ownership is
/// not checked here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated server name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyServerName`] when the value is empty
    /// after trimming, [`RegistryDomainError::ServerNameTooLong`] when it
    /// exceeds 200 characters, or [`RegistryDomainError::InvalidServerName`]
    /// when it is not a single `/`-separated namespace and slug.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(RegistryDomainError::EmptyServerName);
        }

        if normalized.len() > MAX_NAME_LENGTH {
            return Err(RegistryDomainError::ServerNameTooLong(raw));
        }

        let Some((namespace, slug)) = normalized.split_once('/') else {
            return Err(RegistryDomainError::InvalidServerName(raw));
        };

        let namespace_valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        let slug_valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');

        if !namespace_valid || !slug_valid {
            return Err(RegistryDomainError::InvalidServerName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the reverse-DNS-like namespace before the `/`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once('/').map_or("", |(namespace, _)| namespace)
    }

    /// Returns the slug after the `/`.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, slug)| slug)
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ServerName {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerName> for String {
    fn from(value: ServerName) -> Self {
        value.0
    }
}
