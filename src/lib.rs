//! MCP registry: listing and version resolution for published servers.
//!
//! This crate stores published server descriptors, one entry per
//! `(name, version)`, keeps the latest version of every name materialized
//! on write, and answers filtered, cursor-paginated listings and point
//! lookups.
//!
//! # Architecture
//!
//! The registry follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Orchestration consumed by the transport layer
//!
//! # Modules
//!
//! - [`server_registry`]: Entries, latest resolution, filters, and pagination

pub mod server_registry;
