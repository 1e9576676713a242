//! Named-function invocation dispatcher.
//!
//! A peer hands the contract a function name and a list of string
//! arguments. This adapter validates both, calls the matching
//! [`HouseContract`] operation and folds the outcome into an
//! [`InvocationResponse`] shaped like a peer response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::ports::{ClientIdentity, HouseContract};
use crate::domain::{ErrorCode, HouseRegistryError};

/// Name under which the contract is deployed; accepted as a function prefix.
pub const CONTRACT_NAME: &str = "SmartContract";

/// Operations exposed through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HouseFunction {
    /// `CreateHouse(id, address, size)`.
    CreateHouse,
    /// `ReadHouse(id)`.
    ReadHouse,
    /// `HouseExists(id)`.
    HouseExists,
    /// `TransferHouse(id, newOwner)`.
    TransferHouse,
    /// `GetAllHouses()`.
    GetAllHouses,
}

impl HouseFunction {
    /// Every dispatchable function.
    pub const ALL: [Self; 5] = [
        Self::CreateHouse,
        Self::ReadHouse,
        Self::HouseExists,
        Self::TransferHouse,
        Self::GetAllHouses,
    ];

    /// Invocation name of the function.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateHouse => "CreateHouse",
            Self::ReadHouse => "ReadHouse",
            Self::HouseExists => "HouseExists",
            Self::TransferHouse => "TransferHouse",
            Self::GetAllHouses => "GetAllHouses",
        }
    }

    /// Whether the function leaves the world state untouched.
    ///
    /// Hosts use this to decide whether a successful invocation has state
    /// to commit.
    ///
    /// # Examples
    /// ```
    /// use house_registry::inbound::HouseFunction;
    ///
    /// assert!(HouseFunction::ReadHouse.is_read_only());
    /// assert!(!HouseFunction::TransferHouse.is_read_only());
    /// ```
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(
            self,
            Self::ReadHouse | Self::HouseExists | Self::GetAllHouses
        )
    }
}

impl fmt::Display for HouseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseFunction {
    type Err = InvocationError;

    /// Parse a function name, with or without the `SmartContract:` prefix.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw
            .strip_prefix(CONTRACT_NAME)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(raw);
        Self::ALL
            .into_iter()
            .find(|function| function.name() == name)
            .ok_or_else(|| InvocationError::UnknownFunction {
                name: raw.to_owned(),
            })
    }
}

/// A named call with positional string arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Function name, optionally prefixed with [`CONTRACT_NAME`].
    pub function: String,
    /// Positional arguments.
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation from a function name and arguments.
    #[must_use]
    pub fn new<I, A>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Failures raised while dispatching an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The function name matches no operation.
    #[error("unknown function {name}")]
    UnknownFunction {
        /// Name as supplied by the caller.
        name: String,
    },
    /// The function was called with the wrong number of arguments.
    #[error("{function} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Function that was called.
        function: HouseFunction,
        /// Arguments the function takes.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },
    /// An argument could not be parsed.
    #[error("invalid value '{value}' for argument {argument}: {message}")]
    InvalidArgument {
        /// Argument name.
        argument: &'static str,
        /// Value as supplied.
        value: String,
        /// Parser error description.
        message: String,
    },
    /// The response payload could not be encoded.
    #[error("failed to encode response payload: {message}")]
    Payload {
        /// Encoder error description.
        message: String,
    },
    /// The contract operation failed.
    #[error(transparent)]
    Registry(#[from] HouseRegistryError),
}

impl InvocationError {
    /// Stable machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownFunction { .. }
            | Self::ArgumentCount { .. }
            | Self::InvalidArgument { .. } => ErrorCode::InvalidRequest,
            Self::Payload { .. } => ErrorCode::EncodingError,
            Self::Registry(source) => source.code(),
        }
    }
}

/// Outcome of a dispatched invocation, mirroring a peer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// [`InvocationResponse::OK`] or [`InvocationResponse::ERROR`].
    pub status: i32,
    /// Error message; empty on success.
    pub message: String,
    /// Result bytes; empty for writes and failures.
    pub payload: Vec<u8>,
    /// Failure category; `None` on success.
    pub code: Option<ErrorCode>,
}

impl InvocationResponse {
    /// Status of a successful invocation.
    pub const OK: i32 = 200;
    /// Status of a failed invocation.
    pub const ERROR: i32 = 500;

    /// Successful response carrying `payload`.
    #[must_use]
    pub const fn success(payload: Vec<u8>) -> Self {
        Self {
            status: Self::OK,
            message: String::new(),
            payload,
            code: None,
        }
    }

    /// Failed response describing `error`.
    #[must_use]
    pub fn failure(error: &InvocationError) -> Self {
        Self {
            status: Self::ERROR,
            message: error.to_string(),
            payload: Vec::new(),
            code: Some(error.code()),
        }
    }

    /// Whether the invocation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

/// Dispatch `invocation` to `contract` on behalf of `caller`.
///
/// Never fails: every error is folded into the response.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use house_registry::HouseRegistryService;
/// use house_registry::inbound::{Invocation, InvocationResponse, dispatch};
/// use house_registry::outbound::{MemoryWorldState, StaticMspIdentity};
///
/// let registry = HouseRegistryService::new(Arc::new(MemoryWorldState::new()));
/// let org_a = StaticMspIdentity::new("OrgA");
///
/// let created = dispatch(
///     &registry,
///     &org_a,
///     &Invocation::new("CreateHouse", ["H1", "221B Baker St", "120"]),
/// );
/// assert_eq!(created.status, InvocationResponse::OK);
///
/// let exists = dispatch(&registry, &org_a, &Invocation::new("HouseExists", ["H1"]));
/// assert_eq!(exists.payload, b"true");
/// ```
#[must_use]
pub fn dispatch<C>(
    contract: &C,
    caller: &dyn ClientIdentity,
    invocation: &Invocation,
) -> InvocationResponse
where
    C: HouseContract + ?Sized,
{
    match execute(contract, caller, invocation) {
        Ok(payload) => {
            debug!(
                function = %invocation.function,
                payload_len = payload.len(),
                "invocation succeeded"
            );
            InvocationResponse::success(payload)
        }
        Err(error) => {
            warn!(
                function = %invocation.function,
                code = ?error.code(),
                error = %error,
                "invocation failed"
            );
            InvocationResponse::failure(&error)
        }
    }
}

/// Run `invocation` and return the raw payload.
///
/// # Errors
///
/// Returns [`InvocationError`] when the function is unknown, the arguments
/// do not fit it or the contract operation fails.
pub fn execute<C>(
    contract: &C,
    caller: &dyn ClientIdentity,
    invocation: &Invocation,
) -> Result<Vec<u8>, InvocationError>
where
    C: HouseContract + ?Sized,
{
    let function: HouseFunction = invocation.function.parse()?;
    let args = invocation.args.as_slice();

    match function {
        HouseFunction::CreateHouse => {
            let [id, address, raw_size] = arguments::<3>(function, args)?;
            contract.create_house(caller, id, address, parse_size(raw_size)?)?;
            Ok(Vec::new())
        }
        HouseFunction::ReadHouse => {
            let [id] = arguments::<1>(function, args)?;
            let house = contract.read_house(id)?;
            Ok(house.to_state_bytes()?)
        }
        HouseFunction::HouseExists => {
            let [id] = arguments::<1>(function, args)?;
            let exists = contract.house_exists(id)?;
            Ok(if exists { b"true".to_vec() } else { b"false".to_vec() })
        }
        HouseFunction::TransferHouse => {
            let [id, new_owner] = arguments::<2>(function, args)?;
            contract.transfer_house(caller, id, new_owner)?;
            Ok(Vec::new())
        }
        HouseFunction::GetAllHouses => {
            arguments::<0>(function, args)?;
            let houses = contract.get_all_houses()?;
            serde_json::to_vec(&houses).map_err(|err| InvocationError::Payload {
                message: err.to_string(),
            })
        }
    }
}

fn arguments<const N: usize>(
    function: HouseFunction,
    args: &[String],
) -> Result<&[String; N], InvocationError> {
    <&[String; N]>::try_from(args).map_err(|_| InvocationError::ArgumentCount {
        function,
        expected: N,
        actual: args.len(),
    })
}

fn parse_size(raw: &str) -> Result<i64, InvocationError> {
    raw.parse::<i64>()
        .map_err(|err| InvocationError::InvalidArgument {
            argument: "size",
            value: raw.to_owned(),
            message: err.to_string(),
        })
}
