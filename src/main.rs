//! Joystick mapping service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / joymap-ctl
//!            │
//!            ▼
//!     ┌─────────────┐      ┌──────────────┐      ┌──────────────┐
//!     │    http     │─────▶│   mapping    │─────▶│    driver    │
//!     │   server    │      │ merge + save │      │  supervisor  │
//!     └─────────────┘      └──────────────┘      └──────┬───────┘
//!            │                     │                    │
//!            ▼                     ▼                    ▼
//!       public/ files        mapping.json         raw_joystick
//!
//!     ┌────────────────────────────────────────────────────────┐
//!     │ config · observability (logs ring, metrics) · lifecycle│
//!     └────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use joymap::config::resolve_config;
use joymap::http::HttpServer;
use joymap::lifecycle::{bootstrap, startup::binary_dir, wait_for_signal, Shutdown};
use joymap::observability::{init_logging, metrics::init_metrics, LogBuffer};

#[derive(Parser)]
#[command(name = "joymap")]
#[command(about = "Joystick mapping service", long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults to joymap.toml next to the binary)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let base_dir = binary_dir()?;

    let mut config = resolve_config(args.config.as_deref(), &base_dir)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    let logs = LogBuffer::new(config.logs.capacity);
    init_logging(logs.clone());

    tracing::info!("joymap v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        driver = %config.driver.program,
        restart_timeout_ms = config.driver.restart_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = bootstrap(&config, &base_dir, logs).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, service.state, service.paths.static_root);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed"),
        Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
    }

    match service.supervisor.stop().await {
        Ok(outcome) => tracing::info!(outcome = outcome.as_str(), "Driver stopped"),
        Err(e) => tracing::error!(error = %e, "Failed to stop driver"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
