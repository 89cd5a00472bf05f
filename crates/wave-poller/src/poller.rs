//! Periodic evaluation of the mesh state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use wave_core::schedule::{Shutdown, run_periodic};
use wave_types::MeshState;

use crate::client::MeshClient;

/// Mean amplitude over every `malla_A` cell, or `None` if there are none.
pub fn mean_amplitude(state: &MeshState) -> Option<f64> {
    let (sum, count) = state
        .primary_amplitudes()
        .fold((0.0, 0_u32), |(sum, count), amplitude| {
            (sum + amplitude, count.saturating_add(1))
        });
    (count > 0).then(|| sum / f64::from(count))
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// The fetch failed; the cycle was skipped.
    Failed,
    /// The payload had no `malla_A` cells.
    NoCells,
    /// The mean stayed at or below the threshold.
    Nominal {
        /// Mean amplitude.
        mean: f64,
    },
    /// The mean exceeded the threshold and the corrective action ran.
    Corrective {
        /// Mean amplitude.
        mean: f64,
    },
}

/// Hook invoked when the mesh mean exceeds the threshold.
pub trait CorrectiveAction: Send + Sync {
    /// React to an excessive mean amplitude.
    fn trigger(&self, mean: f64, threshold: f64);
}

/// Corrective action that only logs a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCorrectiveAction;

impl CorrectiveAction for LogCorrectiveAction {
    fn trigger(&self, mean: f64, threshold: f64) {
        warn!(mean, threshold, "Mean mesh amplitude high, corrective action triggered");
    }
}

/// Polls the mesh endpoint and evaluates the mean amplitude.
pub struct StatePoller {
    client: MeshClient,
    threshold: f64,
    action: Arc<dyn CorrectiveAction>,
}

impl StatePoller {
    /// Create a poller with the logging corrective action.
    pub fn new(client: MeshClient, threshold: f64) -> Self {
        Self::with_action(client, threshold, Arc::new(LogCorrectiveAction))
    }

    /// Create a poller with a custom corrective action.
    pub const fn with_action(
        client: MeshClient,
        threshold: f64,
        action: Arc<dyn CorrectiveAction>,
    ) -> Self {
        Self {
            client,
            threshold,
            action,
        }
    }

    /// Evaluate an already-fetched payload.
    pub fn evaluate(&self, state: &MeshState) -> PollOutcome {
        let Some(mean) = mean_amplitude(state) else {
            info!("Mesh payload has no cells");
            return PollOutcome::NoCells;
        };

        info!(mean, "Mean mesh amplitude");

        if mean > self.threshold {
            self.action.trigger(mean, self.threshold);
            PollOutcome::Corrective { mean }
        } else {
            PollOutcome::Nominal { mean }
        }
    }

    /// Fetch once and evaluate.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.client.fetch().await {
            Ok(state) => self.evaluate(&state),
            Err(e) => {
                warn!(url = %self.client.url(), error = %e, "Mesh poll failed, skipping cycle");
                PollOutcome::Failed
            }
        }
    }

    /// Poll every `period` until shutdown.
    pub async fn run(&self, period: Duration, shutdown: &Shutdown) {
        run_periodic("state-poller", period, shutdown, || async move {
            self.poll_once().await;
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;

    use wave_types::MeshCell;

    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<f64>>,
    }

    impl CorrectiveAction for Recording {
        fn trigger(&self, mean: f64, _threshold: f64) {
            self.calls.lock().unwrap().push(mean);
        }
    }

    fn mesh(amplitudes: &[f64]) -> MeshState {
        MeshState {
            grid_a: vec![
                amplitudes
                    .iter()
                    .map(|&amplitude| MeshCell {
                        amplitude,
                        ..MeshCell::default()
                    })
                    .collect(),
            ],
            ..MeshState::default()
        }
    }

    fn poller(action: Arc<Recording>) -> StatePoller {
        let client = MeshClient::new("http://127.0.0.1:9/api/malla", Duration::from_millis(10));
        StatePoller::with_action(client, 1.5, action)
    }

    #[test]
    fn mean_over_all_rows() {
        let state = MeshState {
            grid_a: vec![
                vec![MeshCell {
                    amplitude: 1.0,
                    ..MeshCell::default()
                }],
                vec![MeshCell {
                    amplitude: 2.0,
                    ..MeshCell::default()
                }],
            ],
            ..MeshState::default()
        };
        assert!((mean_amplitude(&state).unwrap() - 1.5).abs() < 1e-12);
        assert!(mean_amplitude(&MeshState::default()).is_none());
    }

    #[test]
    fn high_mean_triggers_corrective_action() {
        let action = Arc::new(Recording::default());
        let outcome = poller(action.clone()).evaluate(&mesh(&[1.6]));

        assert!(matches!(outcome, PollOutcome::Corrective { .. }));
        assert_eq!(action.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn nominal_mean_does_not_trigger() {
        let action = Arc::new(Recording::default());
        let outcome = poller(action.clone()).evaluate(&mesh(&[1.4]));

        assert!(matches!(outcome, PollOutcome::Nominal { .. }));
        assert!(action.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let action = Arc::new(Recording::default());
        let outcome = poller(action.clone()).evaluate(&mesh(&[1.0, 2.0]));

        assert!(matches!(outcome, PollOutcome::Nominal { .. }));
        assert!(action.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_grid_stops_early() {
        let action = Arc::new(Recording::default());
        let outcome = poller(action.clone()).evaluate(&mesh(&[]));

        assert_eq!(outcome, PollOutcome::NoCells);
        assert!(action.calls.lock().unwrap().is_empty());
    }
}
