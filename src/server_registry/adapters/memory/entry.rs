//! In-memory repository for server entries.
//!
//! Entries live in a `BTreeMap` keyed by [`EntryId`], so keyset scans are
//! range queries. Every write holds the state lock across the insert or
//! update and the latest re-resolution, so both land together. The `search`
//! scan hint is not evaluated here; callers re-apply their full filter.

use crate::server_registry::{
    domain::{EntryId, ServerEntry, ServerName, resolve_latest},
    ports::{ScanHints, ServerEntryRepository, ServerEntryRepositoryError, ServerEntryRepositoryResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory server entry repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServerEntryRepository {
    state: Arc<RwLock<InMemoryEntryState>>,
}

#[derive(Debug, Default)]
struct InMemoryEntryState {
    entries: BTreeMap<EntryId, ServerEntry>,
    name_index: HashMap<ServerName, BTreeSet<EntryId>>,
}

impl InMemoryEntryState {
    fn entries_of<'a>(&'a self, name: &ServerName) -> impl Iterator<Item = &'a ServerEntry> {
        self.name_index
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id))
    }

    fn refresh_latest(&mut self, name: &ServerName) -> Option<EntryId> {
        let winner = resolve_latest(self.entries_of(name));
        let ids: Vec<EntryId> = self
            .name_index
            .get(name)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        for id in ids {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.mark_latest(Some(id) == winner);
            }
        }
        winner
    }
}

impl InMemoryServerEntryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ServerEntryRepositoryResult<RwLockReadGuard<'_, InMemoryEntryState>> {
        self.state.read().map_err(|err| {
            ServerEntryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ServerEntryRepositoryResult<RwLockWriteGuard<'_, InMemoryEntryState>> {
        self.state.write().map_err(|err| {
            ServerEntryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ServerEntryRepository for InMemoryServerEntryRepository {
    async fn create(&self, entry: &ServerEntry) -> ServerEntryRepositoryResult<Option<EntryId>> {
        let mut state = self.write()?;

        if state.entries.contains_key(&entry.id()) {
            return Err(ServerEntryRepositoryError::DuplicateEntry(entry.id()));
        }

        if state
            .entries_of(entry.name())
            .any(|existing| existing.version().as_str() == entry.version().as_str())
        {
            return Err(ServerEntryRepositoryError::DuplicateVersion {
                name: entry.name().clone(),
                version: entry.version().as_str().to_owned(),
            });
        }

        state
            .name_index
            .entry(entry.name().clone())
            .or_default()
            .insert(entry.id());
        state.entries.insert(entry.id(), entry.clone());
        Ok(state.refresh_latest(entry.name()))
    }

    async fn update_status(
        &self,
        entry: &ServerEntry,
    ) -> ServerEntryRepositoryResult<Option<EntryId>> {
        let mut state = self.write()?;
        let stored = state
            .entries
            .get_mut(&entry.id())
            .ok_or(ServerEntryRepositoryError::NotFound(entry.id()))?;

        if !stored.status().can_transition_to(entry.status()) {
            return Err(ServerEntryRepositoryError::StatusConflict {
                id: entry.id(),
                stored: stored.status(),
                requested: entry.status(),
            });
        }

        let is_latest = stored.is_latest();
        *stored = entry.clone();
        stored.mark_latest(is_latest);
        Ok(state.refresh_latest(entry.name()))
    }

    async fn list_by_name(
        &self,
        name: &ServerName,
    ) -> ServerEntryRepositoryResult<Vec<ServerEntry>> {
        let state = self.read()?;
        Ok(state.entries_of(name).cloned().collect())
    }

    async fn scan(
        &self,
        hints: &ScanHints,
        after: Option<EntryId>,
        batch_size: usize,
    ) -> ServerEntryRepositoryResult<Vec<ServerEntry>> {
        let state = self.read()?;
        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);

        let batch = state
            .entries
            .range((lower, Bound::Unbounded))
            .map(|(_, entry)| entry)
            .filter(|entry| entry.status().is_listed())
            .filter(|entry| !hints.latest_only || entry.is_latest())
            .filter(|entry| {
                hints
                    .updated_since
                    .is_none_or(|since| entry.updated_at() >= since)
            })
            .take(batch_size)
            .cloned()
            .collect();
        Ok(batch)
    }

    async fn find_version(
        &self,
        name: &ServerName,
        version: &str,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>> {
        let state = self.read()?;
        let found = state
            .entries_of(name)
            .find(|entry| entry.version().as_str() == version)
            .cloned();
        Ok(found)
    }

    async fn find_latest(
        &self,
        name: &ServerName,
    ) -> ServerEntryRepositoryResult<Option<ServerEntry>> {
        let state = self.read()?;
        Ok(state.entries_of(name).find(|entry| entry.is_latest()).cloned())
    }
}
