//! House registry configuration loaded via OrthoConfig.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Snapshot file used when no path is configured.
pub const DEFAULT_STATE_PATH: &str = "world-state.json";

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

/// Configuration for standalone registry invocations.
///
/// Values come from `HOUSE_REGISTRY_*` environment variables or a
/// configuration file; command-line flags of the invoking binary take
/// precedence over both.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOUSE_REGISTRY")]
pub struct RegistrySettings {
    /// World-state snapshot path.
    #[serde(default = "default_state_path")]
    #[ortho_config(default = default_state_path())]
    pub state_path: PathBuf,
    /// MSP identifier the caller acts for.
    pub msp_id: Option<String>,
}

impl RegistrySettings {
    /// Return the configured snapshot path.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Return the configured MSP identifier, if any.
    #[must_use]
    pub fn msp_id(&self) -> Option<&str> {
        self.msp_id.as_deref()
    }
}
