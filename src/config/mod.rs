//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config <path> | joymap.toml beside the binary | defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → lifecycle::startup resolves paths and builds the subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a service restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{DriverConfig, ListenerConfig, ObservabilityConfig, ServiceConfig};
pub use validation::ValidationError;
