//! External driver process management.
//!
//! # Data Flow
//! ```text
//! Supervisor::start / restart / stop
//!     → Launcher::launch (spawn `raw_joystick <udc-device> <udc-driver>`)
//!     → DriverProcess (interrupt → bounded wait → kill)
//!     → output pumps (stdout/stderr → LogBuffer)
//! ```
//!
//! # State Machine
//! ```text
//! Stopped → Starting → Running → StopRequested → Stopped → Starting → …
//! ```

pub mod error;
pub mod output;
pub mod process;
pub mod supervisor;

pub use error::{DriverError, RestartError};
pub use process::{ChildProcess, CommandLauncher, DriverProcess, Launcher};
pub use supervisor::{DriverState, RestartReport, StopOutcome, Supervisor};
