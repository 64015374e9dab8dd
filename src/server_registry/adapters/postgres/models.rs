//! Diesel row models for server entry persistence.

use super::schema::server_entries;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for server entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = server_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServerEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Server name.
    pub name: String,
    /// Exact version string.
    pub version: String,
    /// Description.
    pub description: String,
    /// Package distributions payload.
    pub packages: Value,
    /// Remote distributions payload.
    pub remotes: Value,
    /// Lifecycle status.
    pub status: String,
    /// Latest flag.
    pub is_latest: bool,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for server entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = server_entries)]
pub struct NewServerEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Server name.
    pub name: String,
    /// Exact version string.
    pub version: String,
    /// Description.
    pub description: String,
    /// Package distributions payload.
    pub packages: Value,
    /// Remote distributions payload.
    pub remotes: Value,
    /// Lifecycle status.
    pub status: String,
    /// Latest flag.
    pub is_latest: bool,
    /// Publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}
