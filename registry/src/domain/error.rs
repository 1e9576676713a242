//! Registry error taxonomy.
//!
//! These errors are transport agnostic. The invocation dispatcher maps them
//! to peer responses; embedding hosts can map them to anything else using
//! the stable [`ErrorCode`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ports::{ClientIdentityError, WorldStateError};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The invocation is malformed (unknown function, wrong arguments).
    InvalidRequest,
    /// No house is stored under the requested identifier.
    NotFound,
    /// A house is already stored under the requested identifier.
    AlreadyExists,
    /// The caller does not own the house it tried to transfer.
    Unauthorized,
    /// The caller identity could not be resolved.
    IdentityError,
    /// A house could not be encoded for storage.
    EncodingError,
    /// Stored bytes could not be decoded as a house.
    DecodingError,
    /// The world state rejected a read, write or scan.
    StorageError,
}

/// Failures surfaced by [`HouseContract`](super::ports::HouseContract)
/// operations.
///
/// # Examples
/// ```
/// use house_registry::{ErrorCode, HouseRegistryError};
///
/// let err = HouseRegistryError::already_exists("H1");
/// assert_eq!(err.code(), ErrorCode::AlreadyExists);
/// assert_eq!(err.to_string(), "the house H1 already exists");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HouseRegistryError {
    /// No house is stored under `id`.
    #[error("the house {id} does not exist")]
    NotFound {
        /// Identifier that was looked up.
        id: String,
    },
    /// A house is already stored under `id`.
    #[error("the house {id} already exists")]
    AlreadyExists {
        /// Identifier that collided.
        id: String,
    },
    /// The caller is not the current owner of house `id`.
    #[error("failed to transfer house {id}: caller {caller} is not the owner")]
    Unauthorized {
        /// Identifier of the house the caller tried to transfer.
        id: String,
        /// Identity the caller resolved to.
        caller: String,
    },
    /// The caller identity could not be resolved.
    #[error("failed to resolve client identity: {source}")]
    Identity {
        /// Underlying identity resolution failure.
        #[from]
        source: ClientIdentityError,
    },
    /// The house stored under `id` could not be encoded.
    #[error("failed to encode house {id}: {message}")]
    Encoding {
        /// Identifier of the house being encoded.
        id: String,
        /// Encoder error description.
        message: String,
    },
    /// The bytes stored under `key` are not a house.
    #[error("failed to decode house stored under {key}: {message}")]
    Decoding {
        /// Key whose value failed to decode.
        key: String,
        /// Decoder error description.
        message: String,
    },
    /// The world state failed to serve a read, write or scan.
    #[error("failed to access world state: {source}")]
    Storage {
        /// Underlying world state failure.
        #[from]
        source: WorldStateError,
    },
}

impl HouseRegistryError {
    /// Construct [`HouseRegistryError::NotFound`].
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Construct [`HouseRegistryError::AlreadyExists`].
    #[must_use]
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Construct [`HouseRegistryError::Unauthorized`].
    #[must_use]
    pub fn unauthorized(id: impl Into<String>, caller: impl Into<String>) -> Self {
        Self::Unauthorized {
            id: id.into(),
            caller: caller.into(),
        }
    }

    /// Construct [`HouseRegistryError::Encoding`].
    #[must_use]
    pub fn encoding(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Construct [`HouseRegistryError::Decoding`].
    #[must_use]
    pub fn decoding(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decoding {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::Identity { .. } => ErrorCode::IdentityError,
            Self::Encoding { .. } => ErrorCode::EncodingError,
            Self::Decoding { .. } => ErrorCode::DecodingError,
            Self::Storage { .. } => ErrorCode::StorageError,
        }
    }
}
