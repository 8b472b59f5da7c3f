//! On-disk persistence of the mapping document.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mapping::document::Document;

/// Errors raised while reading or writing `mapping.json`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("mapping file {path} is not a valid JSON object: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode mapping: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write mapping file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The single persisted mapping document.
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file as `{}` if it does not exist yet.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(false),
            Ok(false) => {
                self.save(&Document::new()).await?;
                tracing::info!(path = %self.path.display(), "Created empty mapping file");
                Ok(true)
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Strict read: I/O and decode failures are errors.
    pub async fn read(&self) -> Result<Document, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Lenient read used as the base of a merge: a missing or corrupt file
    /// degrades to an empty document.
    pub async fn load(&self) -> Document {
        match self.read().await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Starting merge from an empty mapping");
                Document::new()
            }
        }
    }

    /// Write the document pretty-printed. The file is replaced atomically.
    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Encode)?;
        bytes.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&tmp, &bytes).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Mapping saved");
        Ok(())
    }
}
