//! Controller configuration.
//!
//! Everything needed to build a [`ValveController`](crate::app::service::ValveController):
//! where the board lives, which valves exist and their polarity, whether
//! to simulate, and how long to let lines settle after a hardware write.
//! Configuration is loaded, never persisted.

use core::fmt;
use core::time::Duration;
use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::app::polarity::{ValveId, ValveSet};

/// Upper bound accepted for `settle_delay_ms`.
pub const MAX_SETTLE_DELAY_MS: u32 = 1000;

/// Whether the controller drives a real board or simulates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Real,
    Virtual,
}

/// How to reach the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Serial port or other connection identifier, e.g. `/dev/ttyACM0`.
    pub port: String,
    /// Board type identifier understood by the board driver.
    pub board_type: String,
}

impl ConnectionParams {
    pub fn new(port: impl Into<String>, board_type: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            board_type: board_type.into(),
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::new("", "uno")
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub connection: ConnectionParams,
    /// Valve id → polarity (`true` = normally closed).
    pub valves: BTreeMap<ValveId, bool>,
    pub mode: Mode,
    /// Pause after every successful hardware batch write (milliseconds).
    pub settle_delay_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionParams::default(),
            valves: BTreeMap::new(),
            mode: Mode::Real,
            settle_delay_ms: 10,
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(text).context("parsing controller config JSON")?;
        config.validate().context("validating controller config")?;
        Ok(config)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Real && self.connection.port.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "connection.port is required in real mode",
            ));
        }
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(ConfigError::ValidationFailed(
                "settle_delay_ms must be 0–1000",
            ));
        }
        Ok(())
    }

    pub fn valve_set(&self) -> ValveSet {
        ValveSet::new(self.valves.clone())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_delay_ms))
    }
}

/// Configuration rejected by [`ControllerConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
