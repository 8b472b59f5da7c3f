//! The driver process seam.
//!
//! `Launcher` creates processes, `DriverProcess` is the handle the supervisor
//! drives through interrupt, wait and kill. The real implementation wraps a
//! `tokio::process::Child`; tests substitute fakes.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::driver::error::DriverError;
use crate::driver::output::{spawn_output_pump, StreamKind};
use crate::observability::logging::LogBuffer;

/// A live driver process.
#[async_trait]
pub trait DriverProcess: Send {
    /// OS process id, `None` once the process has been reaped.
    fn id(&self) -> Option<u32>;

    /// Ask the process to shut down (SIGINT).
    fn interrupt(&mut self) -> Result<(), DriverError>;

    /// Wait until the process exits.
    async fn wait(&mut self) -> std::io::Result<ExitStatus>;

    /// Forcefully terminate the process and reap it.
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// Something that can start a driver process.
pub trait Launcher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn DriverProcess>, DriverError>;
}

/// Launches the configured driver executable with piped output.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
    logs: LogBuffer,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, logs: LogBuffer) -> Self {
        Self {
            program: program.into(),
            args,
            logs,
        }
    }
}

impl Launcher for CommandLauncher {
    fn launch(&self) -> Result<Box<dyn DriverProcess>, DriverError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DriverError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            spawn_output_pump(stdout, StreamKind::Stdout, self.logs.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_output_pump(stderr, StreamKind::Stderr, self.logs.clone());
        }

        Ok(Box::new(ChildProcess { child }))
    }
}

/// A driver running as a child of this service.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
}

#[async_trait]
impl DriverProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<(), DriverError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Already reaped: nothing left to interrupt.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let raw = i32::try_from(pid).map_err(|_| DriverError::Signal {
            pid,
            reason: "pid out of range".to_string(),
        })?;
        kill(Pid::from_raw(raw), Signal::SIGINT).map_err(|errno| DriverError::Signal {
            pid,
            reason: errno.to_string(),
        })
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<(), DriverError> {
        match self.child.id() {
            None => Ok(()),
            Some(pid) => Err(DriverError::Signal {
                pid,
                reason: "interrupt is only supported on unix".to_string(),
            }),
        }
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn launcher(program: &str, args: &[&str]) -> CommandLauncher {
        CommandLauncher::new(
            program,
            args.iter().map(|a| a.to_string()).collect(),
            LogBuffer::new(32),
        )
    }

    #[tokio::test]
    async fn interrupt_stops_a_cooperative_process() {
        let mut process = launcher("sleep", &["30"]).launch().unwrap();
        assert!(process.id().is_some());

        process.interrupt().unwrap();
        let status = tokio::time::timeout(Duration::from_secs(5), process.wait())
            .await
            .expect("process ignored SIGINT")
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn kill_stops_a_process_ignoring_interrupt() {
        let mut process = launcher("sh", &["-c", "trap '' INT; exec sleep 30"])
            .launch()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        process.interrupt().unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(300), process.wait()).await;
        assert!(waited.is_err(), "process should have ignored SIGINT");

        process.kill().await.unwrap();
        assert!(process.id().is_none());
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let err = launcher("/nonexistent/raw_joystick", &[]).launch().err().unwrap();
        assert!(matches!(err, DriverError::Launch { .. }));
    }

    #[tokio::test]
    async fn output_is_captured() {
        let logs = LogBuffer::new(8);
        let launcher = CommandLauncher::new(
            "sh",
            vec!["-c".into(), "echo ready; echo oops >&2".into()],
            logs.clone(),
        );
        let mut process = launcher.launch().unwrap();
        process.wait().await.unwrap();

        for _ in 0..50 {
            if logs.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let mut lines = logs.snapshot();
        lines.sort();
        assert_eq!(lines, vec!["oops", "ready"]);
    }

    #[tokio::test]
    async fn invalid_utf8_output_does_not_break_the_pipe() {
        let logs = LogBuffer::new(8);
        let launcher = CommandLauncher::new(
            "sh",
            vec![
                "-c".into(),
                "printf 'ok\\n\\377bad\\n'; sleep 0.3; echo after; exit 0".into(),
            ],
            logs.clone(),
        );
        let mut process = launcher.launch().unwrap();
        let status = process.wait().await.unwrap();
        assert!(status.success(), "driver died: {:?}", status);

        for _ in 0..50 {
            if logs.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(logs.snapshot(), vec!["ok", "\u{fffd}bad", "after"]);
    }
}
