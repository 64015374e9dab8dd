//! Entry lifecycle status.

use super::ParseEntryStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a published entry.
///
/// Statuses only move forward: `active → deprecated → deleted`, or straight
/// from `active` to `deleted`. Deleted entries are soft-deleted and remain
/// reachable by exact version lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// The entry is current and listed.
    Active,
    /// The entry is discouraged but still listed.
    Deprecated,
    /// The entry is hidden from listings and never latest.
    Deleted,
}

impl EntryStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deprecated => "deprecated",
            Self::Deleted => "deleted",
        }
    }

    /// Returns whether entries with this status take part in listings and
    /// latest resolution.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        !matches!(self, Self::Deleted)
    }

    /// Returns whether moving to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, _)
                | (Self::Deprecated, Self::Deprecated | Self::Deleted)
                | (Self::Deleted, Self::Deleted)
        )
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EntryStatus {
    type Error = ParseEntryStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "deprecated" => Ok(Self::Deprecated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseEntryStatusError(value.to_owned())),
        }
    }
}
