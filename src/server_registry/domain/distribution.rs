//! Distribution descriptors: installable packages and hosted remotes.

use super::{ParseRegistryTypeError, RegistryDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package registry a server package is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryType {
    /// npm (JavaScript).
    Npm,
    /// `PyPI` (Python).
    Pypi,
    /// OCI container images.
    Oci,
    /// `NuGet` (.NET).
    Nuget,
    /// MCP bundle files downloaded by URL.
    Mcpb,
}

impl RegistryType {
    /// Every supported registry type, in declaration order.
    pub const ALL: [Self; 5] = [Self::Npm, Self::Pypi, Self::Oci, Self::Nuget, Self::Mcpb];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pypi => "pypi",
            Self::Oci => "oci",
            Self::Nuget => "nuget",
            Self::Mcpb => "mcpb",
        }
    }
}

impl fmt::Display for RegistryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RegistryType {
    type Error = ParseRegistryTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| ParseRegistryTypeError(value.to_owned()))
    }
}

/// How a locally installed package is spoken to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PackageTransport {
    /// Process standard input and output.
    Stdio,
    /// Streamable HTTP served by the package on a local URL.
    StreamableHttp {
        /// Endpoint URL.
        url: String,
    },
    /// Server-sent events served by the package on a local URL.
    Sse {
        /// Endpoint URL.
        url: String,
    },
}

impl PackageTransport {
    /// Creates a `streamable-http` package transport.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the URL is empty or not HTTP(S).
    pub fn streamable_http(url: impl Into<String>) -> Result<Self, RegistryDomainError> {
        Ok(Self::StreamableHttp {
            url: validate_http_url(url.into())?,
        })
    }

    /// Creates an `sse` package transport.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the URL is empty or not HTTP(S).
    pub fn sse(url: impl Into<String>) -> Result<Self, RegistryDomainError> {
        Ok(Self::Sse {
            url: validate_http_url(url.into())?,
        })
    }

    /// Returns the endpoint URL for HTTP-based transports.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stdio => None,
            Self::StreamableHttp { url } | Self::Sse { url } => Some(url),
        }
    }
}

/// An installable package distribution of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    registry_type: RegistryType,
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    transport: PackageTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_sha256: Option<String>,
}

impl Package {
    /// Creates a package descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyPackageIdentifier`] when the
    /// identifier is empty after trimming.
    pub fn new(
        registry_type: RegistryType,
        identifier: impl Into<String>,
        transport: PackageTransport,
    ) -> Result<Self, RegistryDomainError> {
        let normalized_identifier = identifier.into().trim().to_owned();
        if normalized_identifier.is_empty() {
            return Err(RegistryDomainError::EmptyPackageIdentifier);
        }

        Ok(Self {
            registry_type,
            identifier: normalized_identifier,
            version: None,
            transport,
            file_sha256: None,
        })
    }

    /// Pins the package version inside its registry.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Records the published file digest. The value is stored as given.
    #[must_use]
    pub fn with_file_sha256(mut self, digest: impl Into<String>) -> Self {
        self.file_sha256 = Some(digest.into());
        self
    }

    /// Returns the package registry.
    #[must_use]
    pub const fn registry_type(&self) -> RegistryType {
        self.registry_type
    }

    /// Returns the registry-specific package identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the pinned package version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the package transport.
    #[must_use]
    pub const fn transport(&self) -> &PackageTransport {
        &self.transport
    }

    /// Returns the published file digest.
    #[must_use]
    pub fn file_sha256(&self) -> Option<&str> {
        self.file_sha256.as_deref()
    }
}

/// A hosted endpoint that serves the server without local installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RemoteTransport {
    /// Streamable HTTP endpoint.
    StreamableHttp {
        /// Endpoint URL.
        url: String,
    },
    /// Server-sent events endpoint.
    Sse {
        /// Endpoint URL.
        url: String,
    },
}

impl RemoteTransport {
    /// Creates a `streamable-http` remote.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the URL is empty or not HTTP(S).
    pub fn streamable_http(url: impl Into<String>) -> Result<Self, RegistryDomainError> {
        Ok(Self::StreamableHttp {
            url: validate_http_url(url.into())?,
        })
    }

    /// Creates an `sse` remote.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the URL is empty or not HTTP(S).
    pub fn sse(url: impl Into<String>) -> Result<Self, RegistryDomainError> {
        Ok(Self::Sse {
            url: validate_http_url(url.into())?,
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::StreamableHttp { url } | Self::Sse { url } => url,
        }
    }
}

fn validate_http_url(raw: String) -> Result<String, RegistryDomainError> {
    let normalized = raw.trim().to_owned();
    if normalized.is_empty() {
        return Err(RegistryDomainError::EmptyTransportUrl);
    }

    let has_valid_prefix = normalized.starts_with("http://") || normalized.starts_with("https://");
    if !has_valid_prefix {
        return Err(RegistryDomainError::InvalidTransportUrl(normalized));
    }

    Ok(normalized)
}
