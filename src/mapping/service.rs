//! Mapping updates: the load → merge → restart → persist cycle.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::driver::{RestartError, RestartReport, Supervisor};
use crate::mapping::document::{Document, SkippedEntry};
use crate::mapping::merge::{merge_mapping, MergeOutcome};
use crate::mapping::store::{MappingStore, StoreError};
use crate::observability::metrics;

/// Why an update was not applied. Nothing is persisted in either case.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Restart(#[from] RestartError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What an accepted update did.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub restart: RestartReport,
    pub skipped: Vec<SkippedEntry>,
}

/// Serializes every update against the document and the driver.
pub struct MappingService {
    store: MappingStore,
    supervisor: Arc<Supervisor>,
    update_lock: Mutex<()>,
}

impl MappingService {
    pub fn new(store: MappingStore, supervisor: Arc<Supervisor>) -> Self {
        Self {
            store,
            supervisor,
            update_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// The persisted document.
    pub async fn current(&self) -> Result<Document, StoreError> {
        self.store.read().await
    }

    /// Merge `patch` into the persisted document, restart the driver and
    /// persist the result. The whole cycle runs under one lock; the document
    /// is only written once the driver restart succeeded.
    pub async fn apply_patch(&self, patch: Document) -> Result<UpdateReport, UpdateError> {
        let _guard = self.update_lock.lock().await;

        let original = self.store.load().await;
        let MergeOutcome { document, skipped } = merge_mapping(original, patch);
        for entry in &skipped {
            tracing::warn!(entry = %entry, "Ignoring patch entry");
        }
        metrics::record_skipped_entries(skipped.len());

        let restart = match self.supervisor.restart().await {
            Ok(report) => report,
            Err(e) => {
                metrics::record_mapping_update("restart_failed");
                tracing::error!(error = %e, "Mapping update rejected, nothing persisted");
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.save(&document).await {
            metrics::record_mapping_update("save_failed");
            tracing::error!(error = %e, "Driver restarted but mapping could not be saved");
            return Err(e.into());
        }

        metrics::record_mapping_update("ok");
        tracing::info!(
            pid = ?restart.pid,
            stop = restart.stop.as_str(),
            skipped = skipped.len(),
            "Mapping updated"
        );
        Ok(UpdateReport { restart, skipped })
    }
}
