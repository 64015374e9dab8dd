//! Server registry listing and version resolution.
//!
//! This module catalogues published MCP server descriptors under namespaced
//! names, keeps exactly one version per name flagged as latest, and serves
//! filtered, cursor-paginated listings plus single-version lookups. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
