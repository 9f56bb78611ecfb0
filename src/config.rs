//! Server configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::gap::SessionTimeouts;
use crate::{AppError, Result};

/// Configurable timeout values (seconds) for the GAP session protocol.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Default per-command timeout; bounds the wait for each output line.
    #[serde(default = "default_command_seconds")]
    pub command_seconds: u64,
    /// Startup handshake timeout; GAP load time varies by installation.
    #[serde(default = "default_startup_seconds")]
    pub startup_seconds: u64,
    /// Grace period between the graceful `QUIT;` and a forced kill.
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

fn default_command_seconds() -> u64 {
    30
}

fn default_startup_seconds() -> u64 {
    30
}

fn default_shutdown_grace_seconds() -> u64 {
    3
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_seconds: default_command_seconds(),
            startup_seconds: default_startup_seconds(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

/// Global configuration parsed from an optional `config.toml`.
///
/// Every field has a usable default, so running without a config file is
/// supported; the GAP executable then comes from the `GAP_EXECUTABLE`
/// environment variable or path discovery.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Explicit path to the GAP executable; discovery applies when unset.
    #[serde(default)]
    pub gap_executable: Option<PathBuf>,
    /// Timeout configuration for the session protocol.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl ServerConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Timeout settings in the form the session manager consumes.
    #[must_use]
    pub fn session_timeouts(&self) -> SessionTimeouts {
        SessionTimeouts::from_secs(
            self.timeouts.command_seconds,
            self.timeouts.startup_seconds,
            self.timeouts.shutdown_grace_seconds,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.timeouts.command_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.command_seconds must be greater than zero".into(),
            ));
        }

        if self.timeouts.startup_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.startup_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
