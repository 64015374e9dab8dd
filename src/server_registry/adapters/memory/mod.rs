//! In-memory adapters for server registry ports.

mod entry;

pub use entry::InMemoryServerEntryRepository;
