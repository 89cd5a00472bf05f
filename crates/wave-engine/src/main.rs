//! Engine binary for watchers-wave.
//!
//! Wires the four concurrent activities of the monitoring loop into one
//! process and runs them until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `watchers-wave.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the tuned-config store and mesh source
//! 4. Install the `Ctrl-C` handler
//! 5. Bind and start the API server (bind failure is fatal)
//! 6. Start the error analyzer, state poller, and live mesh updater
//! 7. Run the simulation to completion on the main task
//! 8. Keep serving until shutdown, then join every task

mod error;
mod tasks;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wave_core::config::WaveConfig;
use wave_core::emitter::EventEmitter;
use wave_core::mesh::MeshSource;
use wave_core::schedule::Shutdown;
use wave_core::simulation::run_simulation;
use wave_core::store::{ConfigStore, JsonFileStore};
use wave_observer::server::ServerConfig;
use wave_observer::startup::spawn_observer;
use wave_observer::state::AppState;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the API port cannot
/// be bound.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = WaveConfig::load().map_err(EngineError::from)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        port = config.server.port,
        events_dir = %config.paths.events_dir.display(),
        config_dir = %config.paths.config_dir.display(),
        error_log = %config.paths.error_log.display(),
        mesh_mode = ?config.mesh.mode,
        "watchers-wave engine starting"
    );

    // 3. Shared resources.
    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::new(config.paths.tuned_config()));
    let mesh = MeshSource::from_config(&config.mesh);

    // 4. Ctrl-C triggers a clean shutdown of every task.
    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Ctrl-C received, shutting down"),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
            }
            shutdown.trigger();
        });
    }

    // 5. API server.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let app_state = Arc::new(AppState::new(Arc::clone(&store), mesh.clone()));
    let (observer_handle, addr) = spawn_observer(&server_config, app_state, Arc::clone(&shutdown))
        .await
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(%addr, "API server started");

    // 6. Background loops.
    let mut handles = vec![
        observer_handle,
        tasks::spawn_analyzer(&config, Arc::clone(&store), Arc::clone(&shutdown)),
        tasks::spawn_poller(&config, Arc::clone(&shutdown)),
    ];
    if let Some(handle) = tasks::spawn_mesh_updater(&mesh, &config.mesh, Arc::clone(&shutdown)) {
        handles.push(handle);
    }

    // 7. Simulation.
    let mut emitter = EventEmitter::new(
        config.paths.event_log(),
        config.simulation.amplitude_threshold,
    );
    let report = run_simulation(&config.simulation, &mut emitter, &shutdown).await;
    info!(
        steps_run = report.steps_run,
        events = report.events_emitted,
        completed = report.completed,
        event_log = %emitter.path().display(),
        "Simulation complete, monitoring continues until Ctrl-C"
    );

    // 8. Wait for shutdown and drain.
    shutdown.cancelled().await;
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Task ended abnormally");
        }
    }

    info!("watchers-wave engine stopped");
    Ok(())
}
