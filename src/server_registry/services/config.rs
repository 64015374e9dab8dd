//! Tunables for listing traversal.

/// Page size used when a listing request omits `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Rows fetched from storage per scan round-trip.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 100;

/// Listing configuration for [`super::ServerRegistryService`].
///
/// The accepted page-size range is fixed; only the default and the storage
/// batch size are tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    default_page_size: u32,
    scan_batch_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl ListingConfig {
    /// Sets the page size used when `limit` is omitted.
    ///
    /// The value is still validated against the accepted range at query
    /// time.
    #[must_use]
    pub const fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    /// Sets the number of rows fetched per scan round-trip; zero becomes one.
    #[must_use]
    pub fn with_scan_batch_size(mut self, scan_batch_size: usize) -> Self {
        self.scan_batch_size = scan_batch_size.max(1);
        self
    }

    /// Returns the page size used when `limit` is omitted.
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Returns the number of rows fetched per scan round-trip.
    #[must_use]
    pub const fn scan_batch_size(&self) -> usize {
        self.scan_batch_size
    }
}
