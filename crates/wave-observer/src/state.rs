//! Shared application state for the API server.

use std::sync::Arc;

use wave_core::mesh::MeshSource;
use wave_core::store::ConfigStore;

use crate::hardware::{HardwareProbe, SysinfoProbe};

/// State handed to every handler.
///
/// Handlers never mutate it; the tuned-config document is read through
/// the store on each request and the mesh through its source.
pub struct AppState {
    /// Tuned-config persistence.
    pub store: Arc<dyn ConfigStore>,
    /// Host hardware probe.
    pub hardware: Arc<dyn HardwareProbe>,
    /// Payload source for `/api/malla`.
    pub mesh: MeshSource,
}

impl AppState {
    /// Create state with the `sysinfo` probe.
    pub fn new(store: Arc<dyn ConfigStore>, mesh: MeshSource) -> Self {
        Self::with_probe(store, Arc::new(SysinfoProbe::new()), mesh)
    }

    /// Create state with a custom hardware probe.
    pub const fn with_probe(
        store: Arc<dyn ConfigStore>,
        hardware: Arc<dyn HardwareProbe>,
        mesh: MeshSource,
    ) -> Self {
        Self {
            store,
            hardware,
            mesh,
        }
    }
}
