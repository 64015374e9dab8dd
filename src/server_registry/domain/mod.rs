//! Domain model for server entries, version precedence, and listings.
//!
//! The registry domain models published server versions, their
//! distributions and lifecycle status, latest-version resolution, listing
//! predicates, and keyset pagination. All infrastructure concerns are kept
//! outside the domain boundary.

mod distribution;
mod entry;
mod error;
mod filter;
mod ids;
mod latest;
mod name;
mod page;
mod status;
mod version;

pub use distribution::{Package, PackageTransport, RegistryType, RemoteTransport};
pub use entry::{PersistedServerEntryData, ServerEntry, ServerManifest};
pub use error::{
    ListingQueryError, ParseEntryStatusError, ParseRegistryTypeError, RegistryDomainError,
};
pub use filter::{
    DistributionFilter, LATEST_SELECTOR, ListingFilter, SearchText, VersionSelector,
    parse_updated_since,
};
pub use ids::EntryId;
pub use latest::{compare_latest, resolve_latest, stale_latest_flags};
pub use name::ServerName;
pub use page::{
    MAX_PAGE_LIMIT, MIN_PAGE_LIMIT, Page, PageCollector, PageCursor, PageLimit, paginate,
};
pub use status::EntryStatus;
pub use version::ServerVersion;
