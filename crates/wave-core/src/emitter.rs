//! Threshold-crossing event emission for the simulation.
//!
//! One line per qualifying step is appended to the event log. The file
//! watcher tails that log, so the line format is fixed by
//! [`WaveEvent`]'s `Display` impl.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use wave_types::WaveEvent;

use crate::integrator::OscillatorState;

/// Appends a [`WaveEvent`] line whenever the amplitude reaches the threshold.
#[derive(Debug)]
pub struct EventEmitter {
    /// Append-only event log.
    path: PathBuf,
    /// Inclusive amplitude threshold.
    threshold: f64,
    /// Events observed so far, including ones whose write failed.
    emitted: u64,
}

impl EventEmitter {
    /// Create an emitter writing to `path`.
    ///
    /// The file and its parent directories are created on the first event.
    pub fn new(path: impl Into<PathBuf>, threshold: f64) -> Self {
        Self {
            path: path.into(),
            threshold,
            emitted: 0,
        }
    }

    /// Path of the event log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events emitted so far.
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Inspect the state at `step` and emit an event if it qualifies.
    ///
    /// A failed write is logged and the simulation continues; the returned
    /// event is still `Some` so callers see what should have been written.
    pub fn observe(&mut self, step: u64, state: &OscillatorState) -> Option<WaveEvent> {
        let amplitude = state.amplitude();
        if amplitude < self.threshold {
            return None;
        }

        let event = WaveEvent {
            step,
            t: state.t,
            amplitude,
        };
        self.emitted = self.emitted.saturating_add(1);

        if let Err(e) = self.append(&event) {
            warn!(
                path = %self.path.display(),
                step,
                error = %e,
                "Failed to append wave event"
            );
        }

        info!(step, t = state.t, amplitude, "Wave event emitted");
        Some(event)
    }

    fn append(&self, event: &WaveEvent) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{event}")
    }
}
