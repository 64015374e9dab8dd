//! Service-level errors and their transport-facing kinds.

use crate::server_registry::{
    domain::{ListingQueryError, RegistryDomainError},
    ports::ServerEntryRepositoryError,
};
use std::fmt;
use thiserror::Error;

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Listing query validation failed.
    #[error(transparent)]
    Query(#[from] ListingQueryError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ServerEntryRepositoryError),
    /// The name, the version, or a latest entry does not exist.
    #[error("server not found: {name} (version: {})", version.as_deref().unwrap_or("any"))]
    NotFound {
        /// Requested server name.
        name: String,
        /// Requested version or selector, when one was given.
        version: Option<String>,
    },
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Stable, transport-independent classification of a service error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryErrorKind {
    /// Unparsable version string.
    InvalidVersion,
    /// Any other invalid manifest or name.
    InvalidEntry,
    /// Backwards status change.
    InvalidStatusTransition,
    /// Unrecognized distribution type.
    InvalidFilter,
    /// Unparsable `updated_since`.
    InvalidTimestamp,
    /// Corrupt or foreign cursor.
    InvalidCursor,
    /// Page size outside `[1, 100]`.
    LimitOutOfRange,
    /// Name and version already published.
    DuplicateVersion,
    /// Absent name, version, or latest.
    NotFound,
    /// Storage unreachable or failing.
    Unavailable,
    /// Unexpected internal failure.
    Internal,
}

impl RegistryErrorKind {
    /// Returns the stable snake-case code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidVersion => "invalid_version",
            Self::InvalidEntry => "invalid_entry",
            Self::InvalidStatusTransition => "invalid_status_transition",
            Self::InvalidFilter => "invalid_filter",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidCursor => "invalid_cursor",
            Self::LimitOutOfRange => "limit_out_of_range",
            Self::DuplicateVersion => "duplicate_version",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for RegistryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RegistryServiceError {
    /// Classifies the error for the transport layer.
    #[must_use]
    pub const fn kind(&self) -> RegistryErrorKind {
        match self {
            Self::Domain(RegistryDomainError::InvalidVersion { .. }) => {
                RegistryErrorKind::InvalidVersion
            }
            Self::Domain(RegistryDomainError::InvalidStatusTransition { .. })
            | Self::Repository(ServerEntryRepositoryError::StatusConflict { .. }) => {
                RegistryErrorKind::InvalidStatusTransition
            }
            Self::Domain(_) => RegistryErrorKind::InvalidEntry,
            Self::Query(ListingQueryError::InvalidFilter(_)) => RegistryErrorKind::InvalidFilter,
            Self::Query(ListingQueryError::InvalidTimestamp(_)) => {
                RegistryErrorKind::InvalidTimestamp
            }
            Self::Query(ListingQueryError::InvalidCursor(_)) => RegistryErrorKind::InvalidCursor,
            Self::Query(ListingQueryError::LimitOutOfRange(_)) => {
                RegistryErrorKind::LimitOutOfRange
            }
            Self::Repository(ServerEntryRepositoryError::DuplicateVersion { .. }) => {
                RegistryErrorKind::DuplicateVersion
            }
            Self::Repository(ServerEntryRepositoryError::NotFound(_)) | Self::NotFound { .. } => {
                RegistryErrorKind::NotFound
            }
            Self::Repository(ServerEntryRepositoryError::Persistence(_)) => {
                RegistryErrorKind::Unavailable
            }
            Self::Repository(
                ServerEntryRepositoryError::DuplicateEntry(_)
                | ServerEntryRepositoryError::InvalidPersistedData(_),
            ) => RegistryErrorKind::Internal,
        }
    }

    /// Builds a not-found error for `name`, optionally naming a version.
    #[must_use]
    pub fn not_found(name: impl Into<String>, version: Option<&str>) -> Self {
        Self::NotFound {
            name: name.into(),
            version: version.map(str::to_owned),
        }
    }
}
