//! Client identity adapter backed by a configured MSP identifier.
//!
//! Used by the command-line host, where the operator states which
//! organisation they act for instead of presenting a certificate.

use crate::domain::ports::{ClientIdentity, ClientIdentityError};

/// Identity resolving to a fixed, operator-supplied MSP identifier.
///
/// # Examples
/// ```
/// use house_registry::ClientIdentity;
/// use house_registry::outbound::StaticMspIdentity;
///
/// let identity = StaticMspIdentity::new("Org1MSP");
/// assert_eq!(identity.msp_id().expect("configured"), "Org1MSP");
///
/// let anonymous = StaticMspIdentity::unset();
/// assert!(anonymous.msp_id().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticMspIdentity {
    msp_id: Option<String>,
}

impl StaticMspIdentity {
    /// Identity resolving to `msp_id`.
    #[must_use]
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: Some(msp_id.into()),
        }
    }

    /// Identity with no MSP identifier configured.
    #[must_use]
    pub const fn unset() -> Self {
        Self { msp_id: None }
    }

    /// Identity built from an optional configuration value.
    #[must_use]
    pub const fn from_option(msp_id: Option<String>) -> Self {
        Self { msp_id }
    }
}

impl ClientIdentity for StaticMspIdentity {
    fn msp_id(&self) -> Result<String, ClientIdentityError> {
        self.msp_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .ok_or_else(ClientIdentityError::missing_msp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::configured(Some("OrgA"), Ok("OrgA".to_owned()))]
    #[case::trimmed(Some("  OrgB \n"), Ok("OrgB".to_owned()))]
    #[case::blank(Some("   "), Err(ClientIdentityError::missing_msp_id()))]
    #[case::missing(None, Err(ClientIdentityError::missing_msp_id()))]
    fn resolves_configured_value(
        #[case] configured: Option<&str>,
        #[case] expected: Result<String, ClientIdentityError>,
    ) {
        let identity = StaticMspIdentity::from_option(configured.map(str::to_owned));
        assert_eq!(identity.msp_id(), expected);
    }
}
