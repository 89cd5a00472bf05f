//! Mesh state poller for watchers-wave.
//!
//! Every tick the poller GETs the mesh payload, averages the amplitudes
//! of `malla_A` and hands means above the threshold to a
//! [`CorrectiveAction`]. Failures are logged and the cycle is skipped.

pub mod client;
pub mod error;
pub mod poller;

pub use client::MeshClient;
pub use error::PollError;
pub use poller::{CorrectiveAction, LogCorrectiveAction, PollOutcome, StatePoller, mean_amplitude};
