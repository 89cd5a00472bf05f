//! Mesh state served on `/api/malla`.
//!
//! Two sources exist. The fixed source returns a constant one-cell payload
//! and is what the poller sees by default. The live source owns a two-grid
//! lattice: every update a resonator moves amplitude from each `malla_A`
//! cell into the matching `malla_B` cell, modulated by the source cell's
//! `q`, and an electron term then damps the receiving cell.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use wave_types::{MeshCell, MeshState, Resonator};

use crate::config::{MeshConfig, MeshMode};
use crate::schedule::{Shutdown, run_periodic};

/// Wave kind reported by the fixed payload.
const FIXED_WAVE_KIND: &str = "FOTON_A";

/// Wave kind reported by the live lattice.
const LIVE_WAVE_KIND: &str = "senoidal";

/// Reference wavelength the transmission factor is normalised against.
const REFERENCE_WAVELENGTH: f64 = 500.0;

/// Constant payload: one cell per grid.
pub fn fixed_mesh_state() -> MeshState {
    MeshState {
        grid_a: vec![vec![MeshCell {
            amplitude: 1.0,
            ..MeshCell::default()
        }]],
        grid_b: vec![vec![MeshCell {
            amplitude: 0.5,
            ..MeshCell::default()
        }]],
        resonator: Resonator {
            tipo_onda: FIXED_WAVE_KIND.to_owned(),
            ..PhosWave::default().descriptor()
        },
    }
}

/// Resonator moving amplitude from grid A into grid B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhosWave {
    /// Transmission coefficient.
    pub transmission: f64,
    /// Fraction of amplitude the source cell keeps.
    pub reflection: f64,
    /// Photon wavelength in nanometres.
    pub lambda_foton: f64,
}

impl Default for PhosWave {
    fn default() -> Self {
        Self {
            transmission: 0.6,
            reflection: 0.4,
            lambda_foton: 600.0,
        }
    }
}

impl PhosWave {
    /// Transmit from `source` into `target`.
    pub fn transmit(&self, source: &mut MeshCell, target: &mut MeshCell) {
        let factor = REFERENCE_WAVELENGTH / self.lambda_foton;
        let modulation = 1.0 + source.q.unwrap_or(0.0);
        target.amplitude += self.transmission * factor * source.amplitude * modulation;
        source.amplitude *= self.reflection;
    }

    fn descriptor(self) -> Resonator {
        Resonator {
            transmission: self.transmission,
            reflection: self.reflection,
            lambda_foton: self.lambda_foton,
            tipo_onda: LIVE_WAVE_KIND.to_owned(),
        }
    }
}

/// Damping applied to each receiving cell after transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Electron {
    /// Fraction of amplitude removed per interaction.
    pub coupling: f64,
}

impl Default for Electron {
    fn default() -> Self {
        Self { coupling: 0.3 }
    }
}

impl Electron {
    /// Remove `coupling` of the cell's amplitude.
    pub const fn interact(self, cell: &mut MeshCell) {
        cell.amplitude -= self.coupling * cell.amplitude;
    }
}

/// Two equally-sized grids coupled by a [`PhosWave`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLattice {
    grid_a: Vec<Vec<MeshCell>>,
    grid_b: Vec<Vec<MeshCell>>,
    resonator: PhosWave,
    electron: Electron,
}

impl MeshLattice {
    /// Build a `rows` x `columns` lattice.
    ///
    /// Grid A cells start at amplitude 1.0 with `q = 0.1 * (x + y)`; grid B
    /// starts empty.
    pub fn new(rows: usize, columns: usize) -> Self {
        let build = |seeded: bool| -> Vec<Vec<MeshCell>> {
            (0..rows)
                .map(|y| {
                    (0..columns)
                        .map(|x| {
                            let index = u32::try_from(x.saturating_add(y)).unwrap_or(u32::MAX);
                            let q = 0.1 * f64::from(index);
                            MeshCell {
                                x: i64::try_from(x).unwrap_or(i64::MAX),
                                y: i64::try_from(y).unwrap_or(i64::MAX),
                                amplitude: if seeded { 1.0 } else { 0.0 },
                                phase: 0.0,
                                q: Some(if seeded { q } else { 0.0 }),
                            }
                        })
                        .collect()
                })
                .collect()
        };

        Self {
            grid_a: build(true),
            grid_b: build(false),
            resonator: PhosWave::default(),
            electron: Electron::default(),
        }
    }

    /// Build a lattice sized by the mesh section.
    pub fn from_config(config: &MeshConfig) -> Self {
        Self::new(config.rows, config.columns)
    }

    /// Advance the lattice by one update.
    pub fn update(&mut self) {
        for (row_a, row_b) in self.grid_a.iter_mut().zip(self.grid_b.iter_mut()) {
            for (cell_a, cell_b) in row_a.iter_mut().zip(row_b.iter_mut()) {
                self.resonator.transmit(cell_a, cell_b);
                self.electron.interact(cell_b);
            }
        }
    }

    /// Copy the lattice into a wire payload.
    pub fn snapshot(&self) -> MeshState {
        MeshState {
            grid_a: self.grid_a.clone(),
            grid_b: self.grid_b.clone(),
            resonator: self.resonator.descriptor(),
        }
    }
}

/// Where `/api/malla` reads its payload from.
#[derive(Debug, Clone)]
pub enum MeshSource {
    /// Constant payload.
    Fixed,
    /// Shared lattice advanced by [`MeshSource::run_updates`].
    Live(Arc<RwLock<MeshLattice>>),
}

impl MeshSource {
    /// Build the source selected by `config.mode`.
    pub fn from_config(config: &MeshConfig) -> Self {
        match config.mode {
            MeshMode::Fixed => Self::Fixed,
            MeshMode::Live => Self::Live(Arc::new(RwLock::new(MeshLattice::from_config(config)))),
        }
    }

    /// Current payload.
    pub async fn snapshot(&self) -> MeshState {
        match self {
            Self::Fixed => fixed_mesh_state(),
            Self::Live(lattice) => lattice.read().await.snapshot(),
        }
    }

    /// Whether a background updater is needed.
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Advance a live lattice every `config.update_interval_secs` until
    /// shutdown. Returns immediately for the fixed source.
    pub async fn run_updates(&self, config: &MeshConfig, shutdown: &Shutdown) {
        let Self::Live(lattice) = self else {
            return;
        };
        run_periodic("mesh-updater", config.update_interval(), shutdown, || async move {
            let mut guard = lattice.write().await;
            guard.update();
            debug!(
                mean_a = mean(guard.grid_a.iter().flatten()),
                mean_b = mean(guard.grid_b.iter().flatten()),
                "Mesh lattice updated"
            );
        })
        .await;
    }
}

fn mean<'a>(cells: impl Iterator<Item = &'a MeshCell>) -> f64 {
    let (sum, count) = cells.fold((0.0, 0_u32), |(sum, count), cell| {
        (sum + cell.amplitude, count.saturating_add(1))
    });
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}
