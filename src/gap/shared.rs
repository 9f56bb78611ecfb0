//! Shared session accessor.
//!
//! Every tool call goes through one [`GapRunner`]; construction is deferred
//! to the first call so the server can come up (and list its tools) on a
//! machine where GAP is missing, with the locator error surfacing per call
//! instead of at startup.

use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::config::ServerConfig;
use crate::gap::locate;
use crate::gap::runner::{GapRunner, SessionTimeouts};
use crate::Result;

/// Lazily-constructed, process-wide [`GapRunner`] handle.
///
/// The first caller builds the runner (resolving the executable path);
/// concurrent first callers are serialized by the cell and all receive the
/// same instance. A failed build is not cached — the next caller retries.
pub struct SharedRunner {
    override_path: Option<PathBuf>,
    timeouts: SessionTimeouts,
    cell: OnceCell<GapRunner>,
}

impl SharedRunner {
    /// Build an accessor from configuration. Nothing is resolved or
    /// spawned here.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            override_path: config.gap_executable.clone(),
            timeouts: config.session_timeouts(),
            cell: OnceCell::new(),
        }
    }

    /// The shared runner, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Locate`] when the GAP executable cannot
    /// be resolved.
    pub async fn get(&self) -> Result<&GapRunner> {
        self.cell
            .get_or_try_init(|| async {
                let executable = locate::resolve(self.override_path.as_deref())?;
                Ok(GapRunner::new(executable, self.timeouts))
            })
            .await
    }

    /// The runner if it has been constructed, without constructing it.
    ///
    /// Used on shutdown to close a session only if one was ever opened.
    #[must_use]
    pub fn initialized(&self) -> Option<&GapRunner> {
        self.cell.get()
    }
}
