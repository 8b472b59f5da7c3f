//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! service events (tracing)  ─┬─▶ stdout
//!                            └─▶ LogBuffer ─▶ GET /api/logs
//! driver stdout/stderr pumps ─┬─▶ service stdout/stderr
//!                             └─▶ LogBuffer
//! counters ─▶ Prometheus exporter (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogBuffer};
