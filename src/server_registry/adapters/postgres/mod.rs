//! `PostgreSQL` adapters for server entry persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresServerEntryRepository, ServerEntryPgPool};
