//! Shared type definitions for the watchers-wave monitoring loop.
//!
//! Every record that crosses a crate boundary or the HTTP surface lives
//! here so the simulation, the poller, and the API server agree on one
//! wire shape.
//!
//! # Modules
//!
//! - [`event`] -- Threshold-crossing records produced by the oscillator
//! - [`tuned`] -- Tuned runtime parameters derived from error volume
//! - [`mesh`] -- Mesh state payload served on `/api/malla`
//! - [`hardware`] -- Host hardware snapshot merged into config responses
//! - [`ingest`] -- Event and error notices pushed in by external agents

pub mod event;
pub mod hardware;
pub mod ingest;
pub mod mesh;
pub mod tuned;

// Re-export all public types at crate root for convenience.
pub use event::WaveEvent;
pub use hardware::{CpuFrequency, CpuInfo, HardwareSnapshot, MemoryInfo};
pub use ingest::{ErrorReport, EventNotice};
pub use mesh::{MeshCell, MeshState, Resonator};
pub use tuned::{ConfigDocument, TunedConfig};
