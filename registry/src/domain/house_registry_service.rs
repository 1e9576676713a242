//! House registry domain service.
//!
//! Implements the [`HouseContract`] driving port on top of an injected
//! [`WorldState`]. Each operation runs to completion synchronously and issues
//! at most one write, so a failed invocation never leaves a partial change
//! behind.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{ClientIdentity, HouseContract, WorldState};
use crate::domain::{House, HouseRegistryError};

/// Range bounds selecting the whole namespace.
const FULL_NAMESPACE: (&str, &str) = ("", "");

/// House registry service implementing the driving port.
#[derive(Clone)]
pub struct HouseRegistryService<S> {
    state: Arc<S>,
}

impl<S> HouseRegistryService<S> {
    /// Create a new service over the given world state.
    #[must_use]
    pub const fn new(state: Arc<S>) -> Self {
        Self { state }
    }
}

impl<S> HouseRegistryService<S>
where
    S: WorldState,
{
    fn write_house(&self, key: &str, house: &House) -> Result<(), HouseRegistryError> {
        let encoded = house.to_state_bytes()?;
        self.state.put_state(key, &encoded)?;
        Ok(())
    }
}

impl<S> HouseContract for HouseRegistryService<S>
where
    S: WorldState,
{
    fn create_house(
        &self,
        caller: &dyn ClientIdentity,
        id: &str,
        address: &str,
        size: i64,
    ) -> Result<(), HouseRegistryError> {
        if self.house_exists(id)? {
            return Err(HouseRegistryError::already_exists(id));
        }

        let owner = caller.msp_id()?;
        let house = House::new(id, owner, address, size);
        self.write_house(id, &house)?;

        info!(house_id = id, owner = %house.owner, size, "house created");
        Ok(())
    }

    fn read_house(&self, id: &str) -> Result<House, HouseRegistryError> {
        debug!(house_id = id, "reading house");
        let stored = self
            .state
            .get_state(id)?
            .ok_or_else(|| HouseRegistryError::not_found(id))?;

        House::from_state_bytes(id, &stored)
    }

    fn house_exists(&self, id: &str) -> Result<bool, HouseRegistryError> {
        Ok(self.state.get_state(id)?.is_some())
    }

    fn transfer_house(
        &self,
        caller: &dyn ClientIdentity,
        id: &str,
        new_owner: &str,
    ) -> Result<(), HouseRegistryError> {
        let current = self.read_house(id)?;
        let caller_msp_id = caller.msp_id()?;

        if current.owner != caller_msp_id {
            warn!(
                house_id = id,
                caller = %caller_msp_id,
                owner = %current.owner,
                "transfer rejected: caller does not own house"
            );
            return Err(HouseRegistryError::unauthorized(id, caller_msp_id));
        }

        let previous_owner = current.owner;
        let transferred = House {
            owner: new_owner.to_owned(),
            ..current
        };
        self.write_house(id, &transferred)?;

        info!(
            house_id = id,
            from = %previous_owner,
            to = new_owner,
            "house transferred"
        );
        Ok(())
    }

    fn get_all_houses(&self) -> Result<Vec<House>, HouseRegistryError> {
        let (start_key, end_key) = FULL_NAMESPACE;
        // The cursor is released when it drops, including on early return.
        let cursor = self.state.get_state_by_range(start_key, end_key)?;

        let mut houses = Vec::new();
        for item in cursor {
            let entry = item?;
            houses.push(House::from_state_bytes(&entry.key, &entry.value)?);
        }

        debug!(count = houses.len(), "listed houses");
        Ok(houses)
    }
}

#[cfg(test)]
#[path = "house_registry_service_tests.rs"]
mod tests;
