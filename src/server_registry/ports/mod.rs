//! Port contracts for server registry persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the registry
//! services.

pub mod repository;

pub use repository::{
    ScanHints, ServerEntryRepository, ServerEntryRepositoryError, ServerEntryRepositoryResult,
};
