//! Driving port exposing the registry operations.
//!
//! The dispatcher and any embedding host talk to the registry through
//! [`HouseContract`]. Operations that make authorisation decisions receive
//! the caller identity explicitly.

use crate::domain::{House, HouseRegistryError};

use super::ClientIdentity;

/// Registry operations available to callers.
pub trait HouseContract {
    /// Register a new house owned by the calling organisation.
    ///
    /// # Errors
    ///
    /// - [`HouseRegistryError::AlreadyExists`] when `id` is taken.
    /// - [`HouseRegistryError::Identity`] when `caller` cannot be resolved.
    /// - [`HouseRegistryError::Encoding`] / [`HouseRegistryError::Storage`]
    ///   when the record cannot be written.
    fn create_house(
        &self,
        caller: &dyn ClientIdentity,
        id: &str,
        address: &str,
        size: i64,
    ) -> Result<(), HouseRegistryError>;

    /// Fetch the house stored under `id`.
    ///
    /// # Errors
    ///
    /// - [`HouseRegistryError::NotFound`] when nothing is stored under `id`.
    /// - [`HouseRegistryError::Decoding`] when the stored bytes are not a
    ///   house.
    /// - [`HouseRegistryError::Storage`] when the lookup fails.
    fn read_house(&self, id: &str) -> Result<House, HouseRegistryError>;

    /// Report whether anything is stored under `id`.
    ///
    /// # Errors
    ///
    /// [`HouseRegistryError::Storage`] when the lookup fails. Absence is
    /// `Ok(false)`.
    fn house_exists(&self, id: &str) -> Result<bool, HouseRegistryError>;

    /// Hand house `id` over to `new_owner`.
    ///
    /// Only the current owner may transfer; `new_owner` is stored as given.
    ///
    /// # Errors
    ///
    /// - Anything [`HouseContract::read_house`] returns.
    /// - [`HouseRegistryError::Identity`] when `caller` cannot be resolved.
    /// - [`HouseRegistryError::Unauthorized`] when `caller` is not the owner.
    /// - [`HouseRegistryError::Encoding`] / [`HouseRegistryError::Storage`]
    ///   when the record cannot be rewritten.
    fn transfer_house(
        &self,
        caller: &dyn ClientIdentity,
        id: &str,
        new_owner: &str,
    ) -> Result<(), HouseRegistryError>;

    /// List every house in the namespace in key order.
    ///
    /// # Errors
    ///
    /// - [`HouseRegistryError::Decoding`] naming the first key whose value is
    ///   not a house; no partial list is returned.
    /// - [`HouseRegistryError::Storage`] when the scan fails.
    fn get_all_houses(&self) -> Result<Vec<House>, HouseRegistryError>;
}
