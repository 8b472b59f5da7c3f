//! Shared utilities for integration tests.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use joymap::config::ServiceConfig;
use joymap::driver::Supervisor;
use joymap::http::HttpServer;
use joymap::lifecycle::{bootstrap, Shutdown};
use joymap::observability::LogBuffer;

/// A running service backed by a temporary directory.
pub struct TestService {
    pub base_url: String,
    pub dir: TempDir,
    pub logs: LogBuffer,
    pub supervisor: Arc<Supervisor>,
    shutdown: Shutdown,
    server: JoinHandle<std::io::Result<()>>,
}

impl TestService {
    /// Stop accepting requests and stop the driver.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.server.await;
        let _ = self.supervisor.stop().await;
    }
}

/// Start the service on an ephemeral port, with a shell script standing in for the driver.
pub async fn start_service() -> TestService {
    start_service_with(|_| {}).await
}

/// Like `start_service`, with a hook to adjust the configuration first.
pub async fn start_service_with(customize: impl FnOnce(&mut ServiceConfig)) -> TestService {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>joymap</h1>").unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.driver.program = "sh".to_string();
    config.driver.args = vec!["-c".to_string(), "echo driver ready; exec sleep 30".to_string()];
    config.driver.restart_timeout_ms = 2_000;
    customize(&mut config);

    let logs = LogBuffer::new(config.logs.capacity);
    let service = bootstrap(&config, dir.path(), logs.clone()).await.unwrap();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let supervisor = service.supervisor.clone();
    let server = HttpServer::new(config, service.state, service.paths.static_root);
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestService {
        base_url: format!("http://{}", addr),
        dir,
        logs,
        supervisor,
        shutdown,
        server,
    }
}
