//! Driver lifecycle errors.

use std::io;

use thiserror::Error;

/// Failure of a single driver lifecycle step.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver executable could not be spawned.
    #[error("failed to launch driver `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The interrupt signal could not be delivered.
    #[error("failed to interrupt driver (pid {pid}): {reason}")]
    Signal { pid: u32, reason: String },

    /// Waiting for the driver to exit failed (not a timeout).
    #[error("failed to wait for driver exit: {0}")]
    Wait(#[source] io::Error),

    /// Forced termination after the grace period failed.
    #[error("failed to kill driver after timeout: {0}")]
    Kill(#[source] io::Error),
}

/// A restart cycle failed; wraps the step that broke it.
#[derive(Debug, Error)]
#[error("driver restart failed: {0}")]
pub struct RestartError(#[from] pub DriverError);

impl RestartError {
    /// The underlying step failure.
    pub fn cause(&self) -> &DriverError {
        &self.0
    }
}
