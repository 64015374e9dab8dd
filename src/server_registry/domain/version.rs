//! Semantic version identifiers for server entries.
//!
//! Wraps the `semver` crate. Identity is the exact version string, so
//! `1.0.0` and `1.0.0+20130313144700` are distinct entries, while precedence
//! follows semantic versioning and ignores build metadata entirely.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum length for a version string, matching the `VARCHAR(255)` column.
const MAX_VERSION_LENGTH: usize = 255;

/// A parsed version string with its original spelling preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    raw: String,
    parsed: semver::Version,
}

impl ServerVersion {
    /// Parses a version string such as `2.1.0-rc.1+build.5`.
    ///
    /// Surrounding whitespace is trimmed; everything else is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidVersion`] when the value is not
    /// a `major.minor.patch[-prerelease][+build]` version or is longer than
    /// 255 bytes.
    pub fn parse(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into().trim().to_owned();
        if raw.len() > MAX_VERSION_LENGTH {
            return Err(RegistryDomainError::InvalidVersion {
                reason: format!("longer than {MAX_VERSION_LENGTH} bytes"),
                value: raw,
            });
        }
        let parsed =
            semver::Version::parse(&raw).map_err(|err| RegistryDomainError::InvalidVersion {
                value: raw.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self { raw, parsed })
    }

    /// Returns the version exactly as published.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u64 {
        self.parsed.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.parsed.minor
    }

    /// Returns the patch component.
    #[must_use]
    pub const fn patch(&self) -> u64 {
        self.parsed.patch
    }

    /// Returns the prerelease identifiers, empty for a release.
    #[must_use]
    pub fn prerelease(&self) -> &str {
        self.parsed.pre.as_str()
    }

    /// Returns the build metadata after `+`, if any.
    #[must_use]
    pub fn build_metadata(&self) -> Option<&str> {
        let build = self.parsed.build.as_str();
        (!build.is_empty()).then_some(build)
    }

    /// Returns whether this is a prerelease version.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.parsed.pre.is_empty()
    }

    /// Compares semantic-versioning precedence, ignoring build metadata.
    ///
    /// Two versions that differ only in build metadata compare `Equal`.
    #[must_use]
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        let (lhs, rhs) = (&self.parsed, &other.parsed);
        lhs.major
            .cmp(&rhs.major)
            .then_with(|| lhs.minor.cmp(&rhs.minor))
            .then_with(|| lhs.patch.cmp(&rhs.patch))
            .then_with(|| lhs.pre.cmp(&rhs.pre))
    }
}

impl AsRef<str> for ServerVersion {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ServerVersion> for String {
    fn from(value: ServerVersion) -> Self {
        value.raw
    }
}
