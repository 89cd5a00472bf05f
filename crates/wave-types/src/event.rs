//! Wave events emitted when the oscillator amplitude crosses its threshold.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An immutable record of one integration step whose amplitude reached
/// the configured threshold.
///
/// The [`Display`](fmt::Display) form is the line written to the event
/// log: `[WaveEvent] step=12, t=0.60, amplitude=1.734`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveEvent {
    /// Zero-based integration step index.
    pub step: u64,
    /// Simulated time at the step, before integration.
    pub t: f64,
    /// Euclidean norm of the oscillator position.
    pub amplitude: f64,
}

impl fmt::Display for WaveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[WaveEvent] step={}, t={:.2}, amplitude={:.3}",
            self.step, self.t, self.amplitude
        )
    }
}
