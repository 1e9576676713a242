//! Port for resolving who is invoking the registry.
//!
//! The host authenticates callers; the registry only needs the identifier of
//! the membership service provider (MSP) the caller's certificate belongs to.
//! Operations that need it take the identity as an explicit argument, so
//! tests can substitute fixed identities.

use super::define_port_error;

define_port_error! {
    /// Errors raised while resolving the caller identity.
    pub enum ClientIdentityError {
        /// The invocation carries no MSP identifier.
        MissingMspId => "client identity has no MSP identifier",
        /// The identity provider failed.
        Unavailable {
            /// Description of the failure.
            message: String
        } => "client identity unavailable: {message}",
    }
}

/// Port for caller identity resolution.
#[cfg_attr(test, mockall::automock)]
pub trait ClientIdentity: Send + Sync {
    /// Return the MSP identifier of the invoking organisation.
    fn msp_id(&self) -> Result<String, ClientIdentityError>;
}

/// Fixture identity that always resolves to the same MSP identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureClientIdentity {
    msp_id: String,
}

impl FixtureClientIdentity {
    /// Create a fixture resolving to `msp_id`.
    #[must_use]
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
        }
    }
}

impl ClientIdentity for FixtureClientIdentity {
    fn msp_id(&self) -> Result<String, ClientIdentityError> {
        Ok(self.msp_id.clone())
    }
}
