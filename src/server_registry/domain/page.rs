//! Keyset pagination over entries ordered by ascending [`EntryId`].
//!
//! A page is cut from a sequence that is already filtered and ordered. The
//! collector accepts one entry beyond the limit so it can tell whether a
//! continuation cursor is needed without counting the full result set.

use super::{EntryId, ListingQueryError, ServerEntry};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fmt;
use uuid::Uuid;

/// Smallest accepted page size.
pub const MIN_PAGE_LIMIT: u32 = 1;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

const CURSOR_PREFIX: &str = "entry:";

/// Validated page size in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Validates a requested page size.
    ///
    /// # Errors
    ///
    /// Returns [`ListingQueryError::LimitOutOfRange`] outside `[1, 100]`.
    pub fn new(requested: i64) -> Result<Self, ListingQueryError> {
        u32::try_from(requested)
            .ok()
            .filter(|limit| (MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(limit))
            .map(Self)
            .ok_or(ListingQueryError::LimitOutOfRange(requested))
    }

    /// Returns the page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the page size as a collection length.
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// Opaque continuation token naming the last entry already returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageCursor(EntryId);

impl PageCursor {
    /// Creates a cursor positioned after `entry_id`.
    #[must_use]
    pub const fn after(entry_id: EntryId) -> Self {
        Self(entry_id)
    }

    /// Returns the last entry identifier already emitted.
    #[must_use]
    pub const fn position(self) -> EntryId {
        self.0
    }

    /// Encodes the cursor as URL-safe base64 text.
    #[must_use]
    pub fn encode(self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{CURSOR_PREFIX}{}", self.0))
    }

    /// Decodes a cursor previously produced by [`PageCursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`ListingQueryError::InvalidCursor`] when the token is not
    /// base64, not UTF-8, lacks the expected prefix, or names no UUID.
    pub fn decode(token: &str) -> Result<Self, ListingQueryError> {
        let invalid = |reason: &str| ListingQueryError::InvalidCursor(reason.to_owned());

        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| invalid("cursor is not base64"))?;
        let text = String::from_utf8(bytes).map_err(|_| invalid("cursor is not UTF-8"))?;
        let raw_id = text
            .strip_prefix(CURSOR_PREFIX)
            .ok_or_else(|| invalid("cursor has an unknown format"))?;
        let uuid = Uuid::parse_str(raw_id).map_err(|_| invalid("cursor names no entry"))?;

        Ok(Self(EntryId::from_uuid(uuid)))
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// One window of entries plus the cursor for the next window, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    entries: Vec<ServerEntry>,
    next_cursor: Option<PageCursor>,
}

impl Page {
    /// Returns the entries in this page.
    #[must_use]
    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    /// Returns the number of entries in this page.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the continuation cursor; `None` on the last page.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<PageCursor> {
        self.next_cursor
    }

    /// Splits the page into its entries and cursor.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ServerEntry>, Option<PageCursor>) {
        (self.entries, self.next_cursor)
    }
}

/// Incrementally fills one page from an ordered stream of matching entries.
#[derive(Debug, Clone)]
pub struct PageCollector {
    limit: PageLimit,
    entries: Vec<ServerEntry>,
    has_more: bool,
}

impl PageCollector {
    /// Creates an empty collector for `limit` entries.
    #[must_use]
    pub fn new(limit: PageLimit) -> Self {
        Self {
            limit,
            entries: Vec::with_capacity(limit.as_usize()),
            has_more: false,
        }
    }

    /// Offers the next matching entry; returns `true` once the page is
    /// settled and no further entries are needed.
    pub fn offer(&mut self, entry: ServerEntry) -> bool {
        if self.is_settled() {
            return true;
        }

        if self.entries.len() < self.limit.as_usize() {
            self.entries.push(entry);
            false
        } else {
            self.has_more = true;
            true
        }
    }

    /// Returns whether the collector has seen an entry beyond the limit.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.has_more
    }

    /// Finishes the page, issuing a cursor only when more entries exist.
    #[must_use]
    pub fn finish(self) -> Page {
        let next_cursor = if self.has_more {
            self.entries
                .last()
                .map(|entry| PageCursor::after(entry.id()))
        } else {
            None
        };

        Page {
            entries: self.entries,
            next_cursor,
        }
    }
}

/// Cuts one page from an ordered sequence that is already filtered.
#[must_use]
pub fn paginate(entries: impl IntoIterator<Item = ServerEntry>, limit: PageLimit) -> Page {
    let mut collector = PageCollector::new(limit);
    for entry in entries {
        if collector.offer(entry) {
            break;
        }
    }
    collector.finish()
}
