//! Diesel schema for server entry persistence.

diesel::table! {
    /// Published server entries, one row per `(name, version)`.
    server_entries (id) {
        /// Time-ordered entry identifier, also the listing order.
        id -> Uuid,
        /// Namespaced server name.
        #[max_length = 200]
        name -> Varchar,
        /// Exact version string including build metadata.
        #[max_length = 255]
        version -> Varchar,
        /// Human-readable description.
        description -> Text,
        /// Package distributions as JSONB.
        packages -> Jsonb,
        /// Remote distributions as JSONB.
        remotes -> Jsonb,
        /// Lifecycle status (`active`, `deprecated`, `deleted`).
        #[max_length = 20]
        status -> Varchar,
        /// Materialized latest flag, unique per name when set.
        is_latest -> Bool,
        /// Publication timestamp.
        published_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}
