//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod client_identity;
mod house_contract;
mod world_state;

#[cfg(test)]
pub use client_identity::MockClientIdentity;
pub use client_identity::{ClientIdentity, ClientIdentityError, FixtureClientIdentity};
pub use house_contract::HouseContract;
#[cfg(test)]
pub use world_state::MockWorldState;
pub use world_state::{FixtureWorldState, StateCursor, StateEntry, WorldState, WorldStateError};
