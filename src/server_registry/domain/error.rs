//! Error types for server registry domain validation and query parsing.

use thiserror::Error;

/// Errors returned while constructing server registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The server name is empty after trimming.
    #[error("server name must not be empty")]
    EmptyServerName,

    /// The server name is not of the form `<namespace>/<slug>`.
    #[error(
        "server name '{0}' must be '<namespace>/<slug>' using only alphanumerics, '.', '-' and '_'"
    )]
    InvalidServerName(String),

    /// The server name exceeds the 200-character storage limit.
    #[error("server name exceeds 200 character limit: {0}")]
    ServerNameTooLong(String),

    /// The version string does not follow semantic versioning.
    #[error("invalid version '{value}': {reason}")]
    InvalidVersion {
        /// Rejected version string.
        value: String,
        /// Parser explanation.
        reason: String,
    },

    /// The server description is empty after trimming.
    #[error("server description must not be empty")]
    EmptyDescription,

    /// A package identifier is empty after trimming.
    #[error("package identifier must not be empty")]
    EmptyPackageIdentifier,

    /// A transport URL is empty after trimming.
    #[error("transport URL must not be empty")]
    EmptyTransportUrl,

    /// A transport URL does not have an `http://` or `https://` prefix.
    #[error("transport URL '{0}' must start with 'http://' or 'https://'")]
    InvalidTransportUrl(String),

    /// The requested status change would move the entry backwards.
    #[error("invalid entry status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
}

/// Errors raised while interpreting a listing query, before any storage access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingQueryError {
    /// The distribution type filter names no known distribution.
    #[error("invalid type parameter: '{0}'")]
    InvalidFilter(String),

    /// The `updated_since` bound is not an RFC 3339 timestamp.
    #[error("invalid updated_since format: '{0}'")]
    InvalidTimestamp(String),

    /// The pagination cursor was not issued by this registry.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// The page limit lies outside `[1, 100]`.
    #[error("limit {0} is outside the accepted range 1..=100")]
    LimitOutOfRange(i64),
}

/// Error returned while parsing entry status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entry status: {0}")]
pub struct ParseEntryStatusError(pub String);

/// Error returned while parsing a package registry type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown package registry type: {0}")]
pub struct ParseRegistryTypeError(pub String);
