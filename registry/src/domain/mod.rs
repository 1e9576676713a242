//! Domain primitives, ports and services for the house registry.
//!
//! Purpose: define the `House` record, its storage encoding, the error
//! taxonomy surfaced to callers and the service enforcing ownership rules.
//! Nothing in here knows how the world state is stored or how callers are
//! authenticated; those concerns sit behind [`ports`].
//!
//! Public surface:
//! - [`House`]: the registered asset record.
//! - [`HouseRegistryError`] and [`ErrorCode`]: failure taxonomy and stable codes.
//! - [`HouseRegistryService`]: implementation of the [`ports::HouseContract`] port.

pub mod error;
pub mod house;
pub mod ports;

mod house_registry_service;

pub use self::error::{ErrorCode, HouseRegistryError};
pub use self::house::House;
pub use self::house_registry_service::HouseRegistryService;

/// Convenient result alias for registry operations.
///
/// # Examples
/// ```
/// use house_registry::domain::{HouseRegistryError, RegistryResult};
///
/// fn lookup() -> RegistryResult<bool> {
///     Err(HouseRegistryError::not_found("H404"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type RegistryResult<T> = Result<T, HouseRegistryError>;
