//! The bounded simulation run.
//!
//! For each step index `0..steps` the current state is checked against the
//! emitter first and then advanced with [`rk4_step`], so step 0 inspects
//! the initial conditions. Steps are paced by `step_delay` and the run can
//! be cut short by [`Shutdown`].

use tracing::info;

use crate::config::SimulationConfig;
use crate::emitter::EventEmitter;
use crate::integrator::{OscillatorParams, OscillatorState, rk4_step};
use crate::schedule::Shutdown;

/// Summary of a finished simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationReport {
    /// Steps actually executed.
    pub steps_run: u64,
    /// Events emitted during the run.
    pub events_emitted: u64,
    /// State after the last executed step.
    pub final_state: OscillatorState,
    /// Whether every configured step ran before shutdown.
    pub completed: bool,
}

/// Run the oscillator for `config.steps()` steps.
pub async fn run_simulation(
    config: &SimulationConfig,
    emitter: &mut EventEmitter,
    shutdown: &Shutdown,
) -> SimulationReport {
    let params = OscillatorParams::from(config);
    let total = config.steps();
    let delay = config.step_delay();
    let events_before = emitter.emitted();

    info!(
        steps = total,
        dt = config.dt,
        threshold = config.amplitude_threshold,
        "Simulation started"
    );

    let mut state = OscillatorState::from_initial(&config.initial);
    let mut steps_run: u64 = 0;

    for step in 0..total {
        if shutdown.is_triggered() {
            break;
        }

        emitter.observe(step, &state);
        state = rk4_step(state, &params);
        steps_run = steps_run.saturating_add(1);

        if !delay.is_zero() {
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    let report = SimulationReport {
        steps_run,
        events_emitted: emitter.emitted().saturating_sub(events_before),
        final_state: state,
        completed: steps_run == total,
    };

    info!(
        steps_run = report.steps_run,
        events = report.events_emitted,
        completed = report.completed,
        "Simulation finished"
    );

    report
}
