//! Shared test helpers for in-memory registry integration tests.

use std::sync::Arc;

use mcp_registry::server_registry::{
    adapters::memory::InMemoryServerEntryRepository,
    domain::{
        Package, PackageTransport, RegistryType, RemoteTransport, ServerEntry, ServerManifest,
        ServerName, ServerVersion,
    },
    services::{ListServersRequest, PublishServerRequest, ServerListing, ServerRegistryService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the in-memory integration tests.
pub type TestService = ServerRegistryService<InMemoryServerEntryRepository, DefaultClock>;

/// Provides a registry service over a fresh in-memory repository.
#[fixture]
pub fn service() -> TestService {
    ServerRegistryService::new(
        Arc::new(InMemoryServerEntryRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Provides a fresh in-memory repository.
#[fixture]
pub fn repo() -> InMemoryServerEntryRepository {
    InMemoryServerEntryRepository::new()
}

/// Builds an unpersisted entry for direct repository tests.
///
/// # Errors
///
/// Returns an error when the name, version, or description is invalid.
pub fn new_entry(name: &str, version: &str) -> Result<ServerEntry, eyre::Report> {
    let manifest = ServerManifest::new(
        ServerName::new(name)?,
        ServerVersion::parse(version)?,
        format!("{name} server"),
    )?;
    Ok(ServerEntry::new(manifest, &DefaultClock))
}

/// Distribution a published fixture server offers.
#[derive(Debug, Clone, Copy)]
pub enum Offering {
    /// A package in the given registry.
    Package(RegistryType),
    /// A hosted streamable HTTP remote.
    Remote,
}

/// Publishes one version with a description and a single distribution.
///
/// # Errors
///
/// Returns an error when validation or persistence fails.
pub async fn publish_with(
    service: &TestService,
    name: &str,
    version: &str,
    description: &str,
    offering: Offering,
) -> Result<ServerEntry, eyre::Report> {
    let base = PublishServerRequest::new(name, version, description);
    let request = match offering {
        Offering::Package(registry_type) => base.with_packages([Package::new(
            registry_type,
            format!("{name}-pkg"),
            PackageTransport::Stdio,
        )?]),
        Offering::Remote => base.with_remotes([RemoteTransport::streamable_http(format!(
            "https://{}.example.com/mcp",
            name.replace('/', "-")
        ))?]),
    };
    Ok(service.publish(request).await?)
}

/// Publishes one version with a default description and an npm package.
///
/// # Errors
///
/// Returns an error when validation or persistence fails.
pub async fn publish(
    service: &TestService,
    name: &str,
    version: &str,
) -> Result<ServerEntry, eyre::Report> {
    publish_with(
        service,
        name,
        version,
        "Test server",
        Offering::Package(RegistryType::Npm),
    )
    .await
}

/// Follows cursors from `request` until the last page, collecting entries.
///
/// # Errors
///
/// Returns an error when any page fails or a page exceeds `max_pages`.
pub async fn collect_all_pages(
    service: &TestService,
    request: ListServersRequest,
    max_pages: usize,
) -> Result<Vec<ServerListing>, eyre::Report> {
    let mut pages = Vec::new();
    let mut next = Some(request);
    while let Some(current) = next.take() {
        eyre::ensure!(pages.len() < max_pages, "traversal exceeded {max_pages} pages");
        let listing = service.list_servers(&current).await?;
        next = listing
            .next_cursor()
            .map(|cursor| current.clone().with_cursor(cursor));
        pages.push(listing);
    }
    Ok(pages)
}

/// Returns `(name, version)` pairs of every entry across `pages`.
#[must_use]
pub fn name_versions(pages: &[ServerListing]) -> Vec<(String, String)> {
    pages
        .iter()
        .flat_map(|page| page.servers.iter())
        .map(|server| {
            (
                server.name().as_str().to_owned(),
                server.version().as_str().to_owned(),
            )
        })
        .collect()
}
