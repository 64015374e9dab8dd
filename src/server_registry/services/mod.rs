//! Application services for publishing, listing, and resolving server
//! entries.

mod config;
mod error;
mod listing;
mod locks;
mod registry;
mod request;

pub use config::ListingConfig;
pub use error::{RegistryErrorKind, RegistryServiceError, RegistryServiceResult};
pub use listing::{ListingMetadata, ServerListing};
pub use locks::{NameGuard, NameLocks};
pub use registry::ServerRegistryService;
pub use request::{ListServersRequest, PublishServerRequest};
