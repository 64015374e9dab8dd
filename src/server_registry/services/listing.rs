//! Listing response returned to the transport layer.

use crate::server_registry::domain::{Page, ServerEntry};
use serde::Serialize;

/// Page metadata accompanying a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingMetadata {
    /// Number of entries in this page, not the total match count.
    pub count: usize,
    /// Cursor for the next page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Entries plus page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerListing {
    /// Entries in this page.
    pub servers: Vec<ServerEntry>,
    /// Page metadata.
    pub metadata: ListingMetadata,
}

impl ServerListing {
    /// Builds a single, complete listing with no continuation.
    #[must_use]
    pub fn complete(servers: Vec<ServerEntry>) -> Self {
        Self {
            metadata: ListingMetadata {
                count: servers.len(),
                next_cursor: None,
            },
            servers,
        }
    }

    /// Returns the number of entries in this page.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.metadata.count
    }

    /// Returns the continuation cursor, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.metadata.next_cursor.as_deref()
    }
}

impl From<Page> for ServerListing {
    fn from(page: Page) -> Self {
        let (servers, next_cursor) = page.into_parts();
        Self {
            metadata: ListingMetadata {
                count: servers.len(),
                next_cursor: next_cursor.map(|cursor| cursor.encode()),
            },
            servers,
        }
    }
}
