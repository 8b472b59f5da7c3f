//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve file locations relative to the binary
//! - Create `mapping.json` as `{}` when missing
//! - Launch the driver before traffic is accepted
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The mapping file exists before the driver first reads it

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, ServiceConfig};
use crate::driver::{CommandLauncher, DriverError, Supervisor};
use crate::http::AppState;
use crate::mapping::{MappingService, MappingStore, StoreError};
use crate::observability::LogBuffer;

/// Default mapping file name.
pub const MAPPING_FILE: &str = "mapping.json";
/// Default static directory name.
pub const STATIC_DIR: &str = "public";

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot locate the service binary: {0}")]
    Executable(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// File locations the service works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub mapping_file: PathBuf,
    pub static_root: PathBuf,
}

impl Paths {
    /// Configured paths win; otherwise both live in `base_dir`.
    pub fn resolve(config: &ServiceConfig, base_dir: &Path) -> Self {
        Self {
            mapping_file: config
                .mapping
                .path
                .clone()
                .unwrap_or_else(|| base_dir.join(MAPPING_FILE)),
            static_root: config
                .static_files
                .root
                .clone()
                .unwrap_or_else(|| base_dir.join(STATIC_DIR)),
        }
    }
}

/// Directory containing the running executable.
pub fn binary_dir() -> Result<PathBuf, StartupError> {
    let exe = std::env::current_exe().map_err(StartupError::Executable)?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// A started service, ready to be served over HTTP.
pub struct Service {
    pub state: AppState,
    pub supervisor: Arc<Supervisor>,
    pub paths: Paths,
}

/// Prepare the mapping file, start the driver and assemble the app state.
pub async fn bootstrap(
    config: &ServiceConfig,
    base_dir: &Path,
    logs: LogBuffer,
) -> Result<Service, StartupError> {
    let paths = Paths::resolve(config, base_dir);
    tracing::info!(
        mapping = %paths.mapping_file.display(),
        static_root = %paths.static_root.display(),
        "Paths resolved"
    );

    let store = MappingStore::new(&paths.mapping_file);
    store.ensure_exists().await?;

    let launcher = CommandLauncher::new(
        config.driver.program.clone(),
        config.driver.args.clone(),
        logs.clone(),
    );
    let supervisor = Arc::new(Supervisor::new(
        Box::new(launcher),
        config.driver.restart_timeout(),
    ));
    supervisor.start().await?;

    let mapping = Arc::new(MappingService::new(store, supervisor.clone()));
    Ok(Service {
        state: AppState { mapping, logs },
        supervisor,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_to_base_dir() {
        let paths = Paths::resolve(&ServiceConfig::default(), Path::new("/opt/joymap"));
        assert_eq!(paths.mapping_file, PathBuf::from("/opt/joymap/mapping.json"));
        assert_eq!(paths.static_root, PathBuf::from("/opt/joymap/public"));
    }

    #[test]
    fn configured_paths_win() {
        let mut config = ServiceConfig::default();
        config.mapping.path = Some(PathBuf::from("/etc/joymap/mapping.json"));
        config.static_files.root = Some(PathBuf::from("/srv/ui"));

        let paths = Paths::resolve(&config, Path::new("/opt/joymap"));
        assert_eq!(paths.mapping_file, PathBuf::from("/etc/joymap/mapping.json"));
        assert_eq!(paths.static_root, PathBuf::from("/srv/ui"));
    }

    #[tokio::test]
    async fn missing_driver_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.driver.program = "/nonexistent/raw_joystick".to_string();

        let result = bootstrap(&config, dir.path(), LogBuffer::new(8)).await;
        assert!(matches!(result, Err(StartupError::Driver(DriverError::Launch { .. }))));
        assert!(dir.path().join(MAPPING_FILE).exists());
    }
}
