//! Mirror configuration with documented constants

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{MirrorError, Result};

/// Configuration for the mirror layer
///
/// Threaded explicitly through `WorldDirectory::new`; there is no global
/// config lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Ticks between drift sweeps
    ///
    /// At the nominal 20 ticks per second the default (20) re-checks the
    /// host roughly once per simulated second. Lower values close the
    /// missed-notification window faster at the cost of pulling the host's
    /// live-handle snapshot more often.
    pub reconcile_interval: u64,

    /// Number of tick-duration samples retained for the TPS estimate
    ///
    /// At the default (100), the estimate covers the last five simulated
    /// seconds of a healthy host.
    pub tps_sample_window: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            reconcile_interval: 20,
            tps_sample_window: 100,
        }
    }
}

impl MirrorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.reconcile_interval == 0 {
            return Err(MirrorError::InvalidConfig(
                "reconcile_interval must be at least 1 tick".into(),
            ));
        }
        if self.tps_sample_window == 0 {
            return Err(MirrorError::InvalidConfig(
                "tps_sample_window must be at least 1 sample".into(),
            ));
        }
        Ok(())
    }
}
