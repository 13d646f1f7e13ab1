//! Observer binary for the Atelier simulation.
//!
//! Wires together the simulation engine, the continuous-mode tick
//! driver, and the Axum HTTP/`WebSocket` server.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `atelier-config.yaml` (optional)
//! 3. Initialize the engine with the configured default parameters so
//!    the API has a frame to serve immediately
//! 4. Spawn the tick driver (paused until a `play` command)
//! 5. Serve the observer API until the process terminates

use std::path::Path;
use std::sync::Arc;

use atelier_core::SimulationEngine;
use atelier_observer::config::ObserverConfig;
use atelier_observer::driver::{DriverState, run_driver};
use atelier_observer::server::start_server;
use atelier_observer::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the observer server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("atelier-observer starting");

    // 2. Configuration.
    let config = ObserverConfig::load(Path::new("atelier-config.yaml"))?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        tick_interval_ms = config.driver.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Boot run, so `/` and `/ws` have state before any explicit init.
    let mut engine = SimulationEngine::new();
    let frame = engine.init(config.defaults.clone())?;
    info!(
        num_artists = config.defaults.num_artists,
        style_dim = config.defaults.style_dim,
        edges = frame.links.len(),
        seed = config.defaults.seed,
        "Boot run initialized"
    );

    let state = Arc::new(AppState::new(
        engine,
        DriverState::new(config.driver.tick_interval_ms),
    ));

    // 4. Tick driver (parked until the first `play`).
    let driver_task = tokio::spawn(run_driver(Arc::clone(&state)));

    // 5. Serve until terminated.
    let served = start_server(&config.server, state).await;

    driver_task.abort();
    served?;
    Ok(())
}
