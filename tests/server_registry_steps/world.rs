//! Shared world state for server registry BDD scenarios.

use std::sync::Arc;

use mcp_registry::server_registry::{
    adapters::memory::InMemoryServerEntryRepository,
    domain::ServerEntry,
    services::{RegistryServiceError, ServerListing, ServerRegistryService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestRegistryService = ServerRegistryService<InMemoryServerEntryRepository, DefaultClock>;

/// Scenario world for server registry behaviour tests.
pub struct RegistryWorld {
    pub service: TestRegistryService,
    pub last_lookup: Option<Result<ServerEntry, RegistryServiceError>>,
    pub last_listing: Option<Result<ServerListing, RegistryServiceError>>,
}

impl RegistryWorld {
    /// Creates a world over an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let service = ServerRegistryService::new(
            Arc::new(InMemoryServerEntryRepository::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            last_lookup: None,
            last_listing: None,
        }
    }

    /// Returns the successful result of the last lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when no lookup ran or it failed.
    pub fn looked_up(&self) -> Result<&ServerEntry, eyre::Report> {
        self.last_lookup
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing lookup result in scenario world"))?
            .as_ref()
            .map_err(|err| eyre::eyre!("unexpected lookup failure: {err}"))
    }

    /// Returns the successful result of the last listing.
    ///
    /// # Errors
    ///
    /// Returns an error when no listing ran or it failed.
    pub fn listed(&self) -> Result<&ServerListing, eyre::Report> {
        self.last_listing
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing listing result in scenario world"))?
            .as_ref()
            .map_err(|err| eyre::eyre!("unexpected listing failure: {err}"))
    }
}

impl Default for RegistryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistryWorld {
    RegistryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
