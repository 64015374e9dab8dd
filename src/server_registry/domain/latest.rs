//! Latest-version resolution for the entries sharing one name.
//!
//! The winner is the listed (non-deleted) entry with maximal version
//! precedence. Equal precedence, which happens when versions differ only in
//! build metadata, falls back to the later `published_at` and then to the
//! greater entry identifier, so the order is total and never yields two
//! winners.

use super::{EntryId, ServerEntry};
use std::cmp::Ordering;

/// Orders two entries by latest-ness; `Greater` means `lhs` wins.
#[must_use]
pub fn compare_latest(lhs: &ServerEntry, rhs: &ServerEntry) -> Ordering {
    lhs.version()
        .cmp_precedence(rhs.version())
        .then_with(|| lhs.published_at().cmp(&rhs.published_at()))
        .then_with(|| lhs.id().cmp(&rhs.id()))
}

/// Selects the latest entry among `entries`, ignoring deleted ones.
///
/// Returns `None` when every entry is deleted or there are none.
#[must_use]
pub fn resolve_latest<'a>(entries: impl IntoIterator<Item = &'a ServerEntry>) -> Option<EntryId> {
    entries
        .into_iter()
        .filter(|entry| entry.status().is_listed())
        .max_by(|lhs, rhs| compare_latest(lhs, rhs))
        .map(ServerEntry::id)
}

/// Entries whose latest flag disagrees with the resolved winner.
///
/// Useful for asserting the invariant and for adapters that flip flags
/// individually.
#[must_use]
pub fn stale_latest_flags<'a>(
    entries: impl IntoIterator<Item = &'a ServerEntry>,
    winner: Option<EntryId>,
) -> Vec<EntryId> {
    entries
        .into_iter()
        .filter(|entry| entry.is_latest() != (Some(entry.id()) == winner))
        .map(ServerEntry::id)
        .collect()
}
