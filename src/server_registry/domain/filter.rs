//! Listing predicates: search text, distribution type, version selector and
//! update bound, combined as a pure conjunction.
//!
//! Every filter is parsed up front so malformed input fails the whole query
//! before any row is read. Evaluation itself is infallible.

use super::{ListingQueryError, RegistryType, ServerEntry};
use chrono::{DateTime, Utc};

/// Literal accepted by the version selector for latest-only listings.
pub const LATEST_SELECTOR: &str = "latest";

/// Distribution kind an entry must offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionFilter {
    /// At least one hosted remote.
    Remote,
    /// At least one package in the given registry.
    Package(RegistryType),
}

impl DistributionFilter {
    /// Parses `remote` or a package registry type name.
    ///
    /// # Errors
    ///
    /// Returns [`ListingQueryError::InvalidFilter`] for any other value.
    pub fn parse(raw: &str) -> Result<Self, ListingQueryError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized == "remote" {
            return Ok(Self::Remote);
        }

        RegistryType::try_from(normalized.as_str())
            .map(Self::Package)
            .map_err(|_| ListingQueryError::InvalidFilter(raw.to_owned()))
    }

    /// Returns the canonical filter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Package(registry_type) => registry_type.as_str(),
        }
    }

    /// Returns whether `entry` offers this distribution.
    #[must_use]
    pub fn matches(self, entry: &ServerEntry) -> bool {
        match self {
            Self::Remote => entry.has_remotes(),
            Self::Package(registry_type) => entry.has_package_in(registry_type),
        }
    }
}

/// Which versions of each name a listing includes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    /// Only entries flagged latest.
    Latest,
    /// Only entries whose version string is exactly this value.
    Exact(String),
}

impl VersionSelector {
    /// Interprets a selector value; `latest` is reserved.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == LATEST_SELECTOR {
            Self::Latest
        } else {
            Self::Exact(trimmed.to_owned())
        }
    }

    /// Returns whether `entry` is selected.
    #[must_use]
    pub fn matches(&self, entry: &ServerEntry) -> bool {
        match self {
            Self::Latest => entry.is_latest(),
            Self::Exact(version) => entry.version().as_str() == version,
        }
    }
}

/// Case-insensitive substring matched against name or description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchText(String);

impl SearchText {
    /// Creates search text, or `None` when it is blank and matches everything.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_lowercase()))
    }

    /// Returns the lowercased needle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the needle occurs in the entry name or description.
    #[must_use]
    pub fn matches(&self, entry: &ServerEntry) -> bool {
        entry.name().as_str().to_lowercase().contains(&self.0)
            || entry.description().to_lowercase().contains(&self.0)
    }
}

/// Parses an inclusive `updated_since` lower bound in RFC 3339 form.
///
/// # Errors
///
/// Returns [`ListingQueryError::InvalidTimestamp`] when parsing fails.
pub fn parse_updated_since(raw: &str) -> Result<DateTime<Utc>, ListingQueryError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| ListingQueryError::InvalidTimestamp(raw.to_owned()))
}

/// Conjunction of listing predicates. Deleted entries never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    search: Option<SearchText>,
    distribution: Option<DistributionFilter>,
    version: Option<VersionSelector>,
    updated_since: Option<DateTime<Utc>>,
}

impl ListingFilter {
    /// Creates a filter that matches every listed entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from raw query values. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ListingQueryError::InvalidFilter`] for an unknown type and
    /// [`ListingQueryError::InvalidTimestamp`] for a malformed bound.
    pub fn parse(
        search: Option<&str>,
        distribution: Option<&str>,
        version: Option<&str>,
        updated_since: Option<&str>,
    ) -> Result<Self, ListingQueryError> {
        fn non_blank(value: Option<&str>) -> Option<&str> {
            value.filter(|raw| !raw.trim().is_empty())
        }

        Ok(Self {
            search: search.and_then(SearchText::new),
            distribution: non_blank(distribution)
                .map(DistributionFilter::parse)
                .transpose()?,
            version: non_blank(version).map(VersionSelector::parse),
            updated_since: non_blank(updated_since)
                .map(parse_updated_since)
                .transpose()?,
        })
    }

    /// Restricts to entries matching `search`.
    #[must_use]
    pub fn with_search(mut self, search: SearchText) -> Self {
        self.search = Some(search);
        self
    }

    /// Restricts to entries offering `distribution`.
    #[must_use]
    pub const fn with_distribution(mut self, distribution: DistributionFilter) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Restricts to entries chosen by `version`.
    #[must_use]
    pub fn with_version(mut self, version: VersionSelector) -> Self {
        self.version = Some(version);
        self
    }

    /// Restricts to entries updated at or after `since`.
    #[must_use]
    pub const fn with_updated_since(mut self, since: DateTime<Utc>) -> Self {
        self.updated_since = Some(since);
        self
    }

    /// Returns the search predicate.
    #[must_use]
    pub const fn search(&self) -> Option<&SearchText> {
        self.search.as_ref()
    }

    /// Returns the distribution predicate.
    #[must_use]
    pub const fn distribution(&self) -> Option<DistributionFilter> {
        self.distribution
    }

    /// Returns the version selector.
    #[must_use]
    pub const fn version(&self) -> Option<&VersionSelector> {
        self.version.as_ref()
    }

    /// Returns the inclusive update bound.
    #[must_use]
    pub const fn updated_since(&self) -> Option<DateTime<Utc>> {
        self.updated_since
    }

    /// Returns whether `entry` satisfies every configured predicate.
    #[must_use]
    pub fn matches(&self, entry: &ServerEntry) -> bool {
        entry.status().is_listed()
            && self.search.as_ref().is_none_or(|search| search.matches(entry))
            && self
                .distribution
                .is_none_or(|distribution| distribution.matches(entry))
            && self
                .version
                .as_ref()
                .is_none_or(|version| version.matches(entry))
            && self
                .updated_since
                .is_none_or(|since| entry.updated_at() >= since)
    }
}
