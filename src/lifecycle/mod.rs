//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Resolve paths → Ensure mapping.json → Start driver → Serve
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → Stop accepting → Drain requests → Stop driver → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then driver, then listener
//! - The driver is stopped with the same grace period as a restart

pub mod shutdown;
pub mod startup;

pub use shutdown::{wait_for_signal, Shutdown};
pub use startup::{bootstrap, Paths, Service, StartupError};
