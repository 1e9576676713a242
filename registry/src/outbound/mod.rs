//! Driven adapters implementing the domain ports.
//!
//! The contract host normally supplies the world state and caller identity.
//! These adapters let the registry run standalone: an ordered in-memory
//! store that can be persisted to a snapshot file, and an identity resolved
//! from configuration.

mod memory_world_state;
mod msp_identity;
mod snapshot;

pub use memory_world_state::{COMPOSITE_KEY_NAMESPACE, MemoryWorldState};
pub use msp_identity::StaticMspIdentity;
pub use snapshot::{
    SNAPSHOT_VERSION, SnapshotError, SnapshotStore, decode_snapshot, encode_snapshot,
};
