//! Driver process supervision.
//!
//! # Responsibilities
//! - Own the single driver process slot
//! - Start, stop and restart the driver
//! - Escalate from SIGINT to a forced kill after the grace period
//!
//! # Design Decisions
//! - One async mutex around the slot: restarts never overlap and there is
//!   never more than one live driver
//! - A timeout is an expected branch (forced kill), not an error
//! - When stopping fails the old process stays in the slot

use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::driver::error::{DriverError, RestartError};
use crate::driver::process::{DriverProcess, Launcher};
use crate::observability::metrics;

/// Lifecycle state of the supervised driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Starting,
    Running,
    StopRequested,
}

/// How the previous driver instance went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No driver was running.
    NotRunning,
    /// The driver exited on its own after SIGINT.
    Graceful,
    /// The grace period elapsed and the driver was killed.
    ForceKilled,
}

impl StopOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopOutcome::NotRunning => "not_running",
            StopOutcome::Graceful => "graceful",
            StopOutcome::ForceKilled => "forced",
        }
    }
}

/// Result of a successful restart cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartReport {
    pub stop: StopOutcome,
    pub pid: Option<u32>,
}

/// Owner of the driver process.
pub struct Supervisor {
    launcher: Box<dyn Launcher>,
    grace: Duration,
    slot: Mutex<Option<Box<dyn DriverProcess>>>,
    state: watch::Sender<DriverState>,
}

impl Supervisor {
    /// Create a supervisor; nothing is launched until `start`.
    pub fn new(launcher: Box<dyn Launcher>, grace: Duration) -> Self {
        let (state, _) = watch::channel(DriverState::Stopped);
        Self {
            launcher,
            grace,
            slot: Mutex::new(None),
            state,
        }
    }

    pub fn state(&self) -> DriverState {
        *self.state.borrow()
    }

    /// Launch the driver if none is running. Returns the pid of the live driver.
    pub async fn start(&self) -> Result<Option<u32>, DriverError> {
        let mut slot = self.slot.lock().await;
        if let Some(process) = slot.as_ref() {
            tracing::debug!(pid = ?process.id(), "Driver already running");
            return Ok(process.id());
        }

        let process = self.launch()?;
        let pid = process.id();
        *slot = Some(process);
        Ok(pid)
    }

    /// Stop the running driver (if any) and launch a replacement.
    pub async fn restart(&self) -> Result<RestartReport, RestartError> {
        let mut slot = self.slot.lock().await;

        let stop = match slot.take() {
            None => StopOutcome::NotRunning,
            Some(mut process) => match self.stop_process(process.as_mut()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    *slot = Some(process);
                    self.state.send_replace(DriverState::Running);
                    metrics::record_driver_restart("failed");
                    tracing::error!(error = %e, "Driver restart aborted, previous instance kept");
                    return Err(e.into());
                }
            },
        };

        let process = match self.launch() {
            Ok(process) => process,
            Err(e) => {
                metrics::record_driver_restart("failed");
                return Err(e.into());
            }
        };
        let pid = process.id();
        *slot = Some(process);

        metrics::record_driver_restart(stop.as_str());
        tracing::info!(pid = ?pid, stop = stop.as_str(), "Driver restarted");
        Ok(RestartReport { stop, pid })
    }

    /// Stop the driver without relaunching it.
    pub async fn stop(&self) -> Result<StopOutcome, DriverError> {
        let mut slot = self.slot.lock().await;
        let Some(mut process) = slot.take() else {
            return Ok(StopOutcome::NotRunning);
        };

        match self.stop_process(process.as_mut()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                *slot = Some(process);
                self.state.send_replace(DriverState::Running);
                Err(e)
            }
        }
    }

    fn launch(&self) -> Result<Box<dyn DriverProcess>, DriverError> {
        self.state.send_replace(DriverState::Starting);
        match self.launcher.launch() {
            Ok(process) => {
                self.state.send_replace(DriverState::Running);
                metrics::record_driver_launch("ok");
                tracing::info!(pid = ?process.id(), "Driver launched");
                Ok(process)
            }
            Err(e) => {
                self.state.send_replace(DriverState::Stopped);
                metrics::record_driver_launch("failed");
                tracing::error!(error = %e, "Driver launch failed");
                Err(e)
            }
        }
    }

    /// SIGINT, bounded wait, then kill if the grace period runs out.
    async fn stop_process(&self, process: &mut dyn DriverProcess) -> Result<StopOutcome, DriverError> {
        let pid = process.id();
        self.state.send_replace(DriverState::StopRequested);

        process.interrupt()?;
        tracing::info!(pid = ?pid, grace_ms = self.grace.as_millis() as u64, "Interrupt sent to driver");

        let outcome = match tokio::time::timeout(self.grace, process.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(pid = ?pid, %status, "Driver exited");
                StopOutcome::Graceful
            }
            Ok(Err(e)) => return Err(DriverError::Wait(e)),
            Err(_) => {
                tracing::warn!(pid = ?pid, "Driver did not exit in time, killing it");
                process.kill().await.map_err(DriverError::Kill)?;
                StopOutcome::ForceKilled
            }
        };

        self.state.send_replace(DriverState::Stopped);
        Ok(outcome)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::{Behavior, FakeLauncher, SharedLauncher};
    use super::*;

    const GRACE: Duration = Duration::from_millis(50);

    fn supervisor(launcher: FakeLauncher) -> (Supervisor, Arc<FakeLauncher>) {
        let launcher = Arc::new(launcher);
        let supervisor = Supervisor::new(Box::new(SharedLauncher(launcher.clone())), GRACE);
        (supervisor, launcher)
    }

    #[tokio::test]
    async fn start_launches_once() {
        let (supervisor, launcher) = supervisor(FakeLauncher::default());
        assert_eq!(supervisor.state(), DriverState::Stopped);

        let first = supervisor.start().await.unwrap();
        let second = supervisor.start().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(launcher.counters.launches(), 1);
        assert_eq!(supervisor.state(), DriverState::Running);
    }

    #[tokio::test]
    async fn graceful_restart() {
        let (supervisor, launcher) = supervisor(FakeLauncher::default());
        let old_pid = supervisor.start().await.unwrap();

        let report = supervisor.restart().await.unwrap();

        assert_eq!(report.stop, StopOutcome::Graceful);
        assert_ne!(report.pid, old_pid);
        assert_eq!(launcher.counters.interrupts(), 1);
        assert_eq!(launcher.counters.kills(), 0);
        assert_eq!(launcher.counters.launches(), 2);
        assert_eq!(supervisor.state(), DriverState::Running);
    }

    #[tokio::test]
    async fn stuck_driver_is_killed_once_then_started_once() {
        let (supervisor, launcher) =
            supervisor(FakeLauncher::with_behaviors([Behavior::IgnoreInterrupt]));
        supervisor.start().await.unwrap();

        let report = supervisor.restart().await.unwrap();

        assert_eq!(report.stop, StopOutcome::ForceKilled);
        assert_eq!(launcher.counters.kills(), 1);
        assert_eq!(launcher.counters.launches(), 2);
        assert_eq!(launcher.counters.max_live(), 1);
    }

    #[tokio::test]
    async fn wait_failure_keeps_previous_process() {
        let (supervisor, launcher) = supervisor(FakeLauncher::with_behaviors([Behavior::FailWait]));
        let pid = supervisor.start().await.unwrap();

        let err = supervisor.restart().await.unwrap_err();

        assert!(matches!(err.cause(), DriverError::Wait(_)));
        assert_eq!(launcher.counters.launches(), 1);
        assert_eq!(supervisor.state(), DriverState::Running);
        assert_eq!(supervisor.start().await.unwrap(), pid);
    }

    #[tokio::test]
    async fn kill_failure_is_a_restart_error() {
        let (supervisor, launcher) = supervisor(FakeLauncher::with_behaviors([Behavior::FailKill]));
        supervisor.start().await.unwrap();

        let err = supervisor.restart().await.unwrap_err();

        assert!(matches!(err.cause(), DriverError::Kill(_)));
        assert_eq!(launcher.counters.kills(), 1);
        assert_eq!(launcher.counters.launches(), 1);
    }

    #[tokio::test]
    async fn signal_failure_is_a_restart_error() {
        let (supervisor, launcher) =
            supervisor(FakeLauncher::with_behaviors([Behavior::FailSignal]));
        supervisor.start().await.unwrap();

        let err = supervisor.restart().await.unwrap_err();

        assert!(matches!(err.cause(), DriverError::Signal { .. }));
        assert_eq!(launcher.counters.kills(), 0);
        assert_eq!(launcher.counters.launches(), 1);
    }

    #[tokio::test]
    async fn restart_without_driver_just_starts() {
        let (supervisor, launcher) = supervisor(FakeLauncher::default());

        let report = supervisor.restart().await.unwrap();

        assert_eq!(report.stop, StopOutcome::NotRunning);
        assert_eq!(launcher.counters.interrupts(), 0);
        assert_eq!(launcher.counters.launches(), 1);
    }

    #[tokio::test]
    async fn failed_relaunch_leaves_slot_empty() {
        let (supervisor, launcher) = supervisor(FakeLauncher::default());
        supervisor.start().await.unwrap();

        launcher.fail_next_launch();
        let err = supervisor.restart().await.unwrap_err();
        assert!(matches!(err.cause(), DriverError::Launch { .. }));
        assert_eq!(supervisor.state(), DriverState::Stopped);

        let report = supervisor.restart().await.unwrap();
        assert_eq!(report.stop, StopOutcome::NotRunning);
        assert_eq!(supervisor.state(), DriverState::Running);
    }

    #[tokio::test]
    async fn concurrent_restarts_never_overlap() {
        let (supervisor, launcher) = supervisor(FakeLauncher::with_behaviors([
            Behavior::ExitOnInterrupt,
            Behavior::IgnoreInterrupt,
        ]));
        supervisor.start().await.unwrap();

        let (a, b) = tokio::join!(supervisor.restart(), supervisor.restart());
        a.unwrap();
        b.unwrap();

        assert_eq!(launcher.counters.launches(), 3);
        assert_eq!(launcher.counters.max_live(), 1);
    }

    #[tokio::test]
    async fn stop_does_not_relaunch() {
        let (supervisor, launcher) = supervisor(FakeLauncher::default());
        supervisor.start().await.unwrap();

        assert_eq!(supervisor.stop().await.unwrap(), StopOutcome::Graceful);
        assert_eq!(supervisor.stop().await.unwrap(), StopOutcome::NotRunning);
        assert_eq!(launcher.counters.launches(), 1);
        assert_eq!(supervisor.state(), DriverState::Stopped);
    }
}
