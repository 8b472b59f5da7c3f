//! Mapping document subsystem.
//!
//! # Data Flow
//! ```text
//! POST /mapping (patch)
//!     → service.rs (take the update lock)
//!     → store.rs   (load current document, empty if missing/corrupt)
//!     → merge.rs   (identity-aware merge)
//!     → driver::Supervisor::restart
//!     → store.rs   (persist, only after a successful restart)
//! ```

pub mod document;
pub mod merge;
pub mod service;
pub mod store;

pub use document::{Document, SkippedEntry};
pub use merge::{merge, merge_mapping, MergeOutcome};
pub use service::{MappingService, UpdateError, UpdateReport};
pub use store::{MappingStore, StoreError};
