//! Reference implementations of the storage collaborators.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::{InMemoryBlobStore, InMemoryMetadataStore};
