//! `house-invoke` command flow.
//!
//! The binary delegates to [`run_from`] so the whole invocation, from
//! argument parsing to snapshot persistence, can be exercised in tests
//! without spawning a process.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::OrthoConfig;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::HouseRegistryService;
use crate::inbound::{HouseFunction, Invocation, dispatch};
use crate::outbound::{SnapshotError, SnapshotStore, StaticMspIdentity};
use crate::settings::RegistrySettings;

/// Program name reported in usage output and handed to the settings loader.
pub const PROGRAM_NAME: &str = "house-invoke";

/// `house-invoke` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "house-invoke",
    about = "Invoke a house registry function against a world-state snapshot",
    version
)]
pub struct CliArgs {
    /// Snapshot file. Falls back to `HOUSE_REGISTRY_STATE_PATH`.
    #[arg(long = "state", value_name = "path")]
    pub state: Option<PathBuf>,
    /// MSP identifier to act as. Falls back to `HOUSE_REGISTRY_MSP_ID`.
    #[arg(long = "msp-id", value_name = "id")]
    pub msp_id: Option<String>,
    /// Function name, e.g. `CreateHouse` or `SmartContract:ReadHouse`.
    #[arg(value_name = "FUNCTION")]
    pub function: String,
    /// Positional function arguments.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Failures that stop an invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The command line could not be parsed, or help or version was asked for.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {message}")]
    Settings {
        /// Loader error description.
        message: String,
    },
    /// The snapshot path is not valid UTF-8.
    #[error("snapshot path is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// Path as configured.
        path: PathBuf,
    },
    /// The snapshot could not be loaded or saved.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// The registry rejected the invocation.
    #[error("{message}")]
    Rejected {
        /// Message from the failed response.
        message: String,
    },
}

/// Parse `args` (program name first) and run the invocation.
///
/// Returns the response payload, empty for writes.
///
/// # Errors
///
/// Returns [`InvokeError`] when the arguments do not parse, the settings or
/// snapshot cannot be loaded, the registry rejects the call or a mutated
/// snapshot cannot be saved.
pub fn run_from<I, T>(args: I) -> Result<Vec<u8>, InvokeError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run(CliArgs::try_parse_from(args)?)
}

/// Run an already parsed invocation.
///
/// Flags take precedence over `HOUSE_REGISTRY_*` settings. The snapshot is
/// written back only after a successful mutating function.
///
/// # Errors
///
/// See [`run_from`].
pub fn run(args: CliArgs) -> Result<Vec<u8>, InvokeError> {
    let settings = RegistrySettings::load_from_iter([OsString::from(PROGRAM_NAME)])
        .map_err(|err| InvokeError::Settings {
            message: err.to_string(),
        })?;
    let configured_path = args.state.unwrap_or(settings.state_path);
    let state_path = Utf8PathBuf::from_path_buf(configured_path)
        .map_err(|path| InvokeError::NonUtf8Path { path })?;
    let caller = StaticMspIdentity::from_option(args.msp_id.or(settings.msp_id));

    let store = SnapshotStore::open(&state_path)?;
    let state = Arc::new(store.load()?);
    let registry = HouseRegistryService::new(Arc::clone(&state));

    let invocation = Invocation::new(args.function, args.args);
    let response = dispatch(&registry, &caller, &invocation);
    if !response.is_ok() {
        return Err(InvokeError::Rejected {
            message: response.message,
        });
    }

    let mutating = invocation
        .function
        .parse::<HouseFunction>()
        .is_ok_and(|function| !function.is_read_only());
    if mutating {
        store.save(&state)?;
        info!(function = %invocation.function, path = %store.path(), "state committed");
    } else {
        debug!(function = %invocation.function, "read-only invocation; nothing to commit");
    }

    Ok(response.payload)
}
