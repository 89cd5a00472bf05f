//! Background loops run alongside the simulation.
//!
//! Each loop is its own Tokio task sharing only the [`Shutdown`] signal
//! and, for the analyzer, the config store. The returned handles finish
//! once shutdown fires and the current tick completes.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;
use wave_core::analyzer::ErrorAnalyzer;
use wave_core::config::{MeshConfig, WaveConfig};
use wave_core::mesh::MeshSource;
use wave_core::schedule::Shutdown;
use wave_core::store::ConfigStore;
use wave_poller::{MeshClient, StatePoller};

/// Spawn the error analyzer loop.
pub fn spawn_analyzer(
    config: &WaveConfig,
    store: Arc<dyn ConfigStore>,
    shutdown: Arc<Shutdown>,
) -> JoinHandle<()> {
    let analyzer = ErrorAnalyzer::new(&config.paths.error_log, config.analyzer.clone(), store);
    info!(
        error_log = %config.paths.error_log.display(),
        interval_secs = config.analyzer.interval_secs,
        "Error analyzer scheduled"
    );
    tokio::spawn(async move { analyzer.run(&shutdown).await })
}

/// Spawn the mesh state poller loop.
pub fn spawn_poller(config: &WaveConfig, shutdown: Arc<Shutdown>) -> JoinHandle<()> {
    let poller_config = &config.poller;
    let client = MeshClient::new(poller_config.url.clone(), poller_config.timeout());
    let poller = StatePoller::new(client, poller_config.amplitude_threshold);
    let period = poller_config.interval();
    info!(
        url = %poller_config.url,
        interval_secs = poller_config.interval_secs,
        "State poller scheduled"
    );
    tokio::spawn(async move { poller.run(period, &shutdown).await })
}

/// Spawn the live mesh updater, or nothing for the fixed source.
pub fn spawn_mesh_updater(
    mesh: &MeshSource,
    config: &MeshConfig,
    shutdown: Arc<Shutdown>,
) -> Option<JoinHandle<()>> {
    if !mesh.is_live() {
        return None;
    }
    let mesh = mesh.clone();
    let config = config.clone();
    info!(
        rows = config.rows,
        columns = config.columns,
        interval_secs = config.update_interval_secs,
        "Live mesh updater scheduled"
    );
    Some(tokio::spawn(async move {
        mesh.run_updates(&config, &shutdown).await;
    }))
}
