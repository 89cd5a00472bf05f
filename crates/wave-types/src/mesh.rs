//! Mesh state payload exposed on `/api/malla` and consumed by the poller.
//!
//! Field names follow the wire format shared with the dashboard and the
//! focus watcher (`malla_A`, `malla_B`, `resonador`), so the Rust names
//! are mapped with `serde(rename)`. Every field is defaulted on input: the
//! poller treats a cell without `amplitude` as zero rather than rejecting
//! the whole payload.

use serde::{Deserialize, Serialize};

/// A single cell of a mesh grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshCell {
    /// Column index.
    #[serde(default)]
    pub x: i64,
    /// Row index.
    #[serde(default)]
    pub y: i64,
    /// Signal amplitude carried by the cell.
    #[serde(default)]
    pub amplitude: f64,
    /// Signal phase in radians.
    #[serde(default)]
    pub phase: f64,
    /// Scalar field modulating transmission out of the cell.
    ///
    /// Only live lattices carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<f64>,
}

/// Descriptor of the resonator coupling the two grids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resonator {
    /// Transmission coefficient.
    #[serde(rename = "T", default)]
    pub transmission: f64,
    /// Reflection coefficient.
    #[serde(rename = "R", default)]
    pub reflection: f64,
    /// Photon wavelength in nanometres.
    #[serde(default)]
    pub lambda_foton: f64,
    /// Wave kind label.
    #[serde(default)]
    pub tipo_onda: String,
}

/// Aggregate state of the two-grid mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshState {
    /// Primary grid, row-major.
    #[serde(rename = "malla_A", default)]
    pub grid_a: Vec<Vec<MeshCell>>,
    /// Secondary grid, row-major.
    #[serde(rename = "malla_B", default)]
    pub grid_b: Vec<Vec<MeshCell>>,
    /// Resonator descriptor.
    #[serde(rename = "resonador", default)]
    pub resonator: Resonator,
}

impl MeshState {
    /// Iterate over the amplitudes of every cell in `malla_A`, row by row.
    pub fn primary_amplitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.grid_a.iter().flatten().map(|cell| cell.amplitude)
    }
}
