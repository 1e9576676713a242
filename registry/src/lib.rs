//! House asset registry transaction program.
//!
//! The crate manages `House` records in a host-provided world state and only
//! lets the current owner hand a house over to another organisation. It is
//! laid out as a hexagon:
//!
//! - [`domain`] holds the [`House`] entity, the error taxonomy, the driven
//!   ports ([`WorldState`], [`ClientIdentity`]) and the [`HouseContract`]
//!   operations implemented by [`HouseRegistryService`].
//! - [`outbound`] provides adapters for the driven ports: an ordered
//!   in-memory world state, JSON snapshot files and a static MSP identity.
//! - [`inbound`] routes named invocations with string arguments onto the
//!   contract, mirroring a peer's transaction entry point.
//! - [`cli`] runs one invocation against a snapshot file for the
//!   `house-invoke` binary.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use house_registry::outbound::{MemoryWorldState, StaticMspIdentity};
//! use house_registry::{HouseContract, HouseRegistryService};
//!
//! let registry = HouseRegistryService::new(Arc::new(MemoryWorldState::new()));
//! let org_a = StaticMspIdentity::new("OrgA");
//!
//! registry
//!     .create_house(&org_a, "H1", "221B Baker St", 120)
//!     .expect("house created");
//! let house = registry.read_house("H1").expect("house stored");
//!
//! assert_eq!(house.owner, "OrgA");
//! ```

pub mod cli;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

pub use domain::ports::{ClientIdentity, HouseContract, WorldState};
pub use domain::{ErrorCode, House, HouseRegistryError, HouseRegistryService};
