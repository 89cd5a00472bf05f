//! Core runtime of watchers-wave.
//!
//! This crate holds everything the engine runs that is not HTTP:
//!
//! - [`integrator`]: RK4 step for the damped 2D oscillator.
//! - [`emitter`] and [`simulation`]: the bounded run that appends a line
//!   to the event log for every step at or above the amplitude threshold.
//! - [`analyzer`] and [`store`]: the error-log reader that derives a
//!   tuned config and persists it through a [`store::ConfigStore`].
//! - [`mesh`]: the mesh payload served to the poller.
//! - [`schedule`]: the shutdown signal and fixed-interval scheduler every
//!   background loop shares.
//! - [`config`]: YAML configuration with environment overrides.

pub mod analyzer;
pub mod config;
pub mod emitter;
pub mod integrator;
pub mod mesh;
pub mod schedule;
pub mod simulation;
pub mod store;

pub use analyzer::{AnalysisOutcome, ErrorAnalyzer, count_recent_errors};
pub use config::{ConfigError, WaveConfig};
pub use emitter::EventEmitter;
pub use integrator::{OscillatorParams, OscillatorState, rk4_step};
pub use mesh::{MeshLattice, MeshSource, fixed_mesh_state};
pub use schedule::{Shutdown, run_periodic};
pub use simulation::{SimulationReport, run_simulation};
pub use store::{ConfigStore, JsonFileStore, MemoryStore, StoreError};
