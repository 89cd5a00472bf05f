//! Classical 4th-order Runge-Kutta integrator for a damped 2D oscillator.
//!
//! Each axis obeys `q'' = -omega^2 q - damping q'`, uncoupled from the
//! other. [`rk4_step`] is a pure function: it takes a state by value and
//! returns the next one, with no side effects and no failure modes.

use serde::{Deserialize, Serialize};

use crate::config::{InitialConditions, SimulationConfig};

/// Position, velocity, and elapsed time of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorState {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// X velocity.
    pub vx: f64,
    /// Y velocity.
    pub vy: f64,
    /// Elapsed simulated time.
    pub t: f64,
}

impl OscillatorState {
    /// Create a state at `t = 0` from initial conditions.
    pub const fn from_initial(initial: &InitialConditions) -> Self {
        Self {
            x: initial.x,
            y: initial.y,
            vx: initial.vx,
            vy: initial.vy,
            t: 0.0,
        }
    }

    /// Euclidean norm of the position, `sqrt(x^2 + y^2)`.
    pub fn amplitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Physical constants of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorParams {
    /// Angular frequency.
    pub omega: f64,
    /// Linear damping coefficient.
    pub damping: f64,
    /// Step size.
    pub dt: f64,
}

impl From<&SimulationConfig> for OscillatorParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            omega: config.omega,
            damping: config.damping,
            dt: config.dt,
        }
    }
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// Time derivative of `(x, y, vx, vy)`.
#[derive(Debug, Clone, Copy)]
struct Derivative {
    dx: f64,
    dy: f64,
    dvx: f64,
    dvy: f64,
}

const fn derivative(x: f64, y: f64, vx: f64, vy: f64, params: &OscillatorParams) -> Derivative {
    let omega_sq = params.omega * params.omega;
    Derivative {
        dx: vx,
        dy: vy,
        dvx: -omega_sq * x - params.damping * vx,
        dvy: -omega_sq * y - params.damping * vy,
    }
}

/// Evaluate the derivative at `state + k * scale`.
const fn derivative_offset(
    state: &OscillatorState,
    k: &Derivative,
    scale: f64,
    params: &OscillatorParams,
) -> Derivative {
    derivative(
        state.x + k.dx * scale,
        state.y + k.dy * scale,
        state.vx + k.dvx * scale,
        state.vy + k.dvy * scale,
        params,
    )
}

/// Advance the oscillator by one step of `params.dt`.
///
/// Four derivative evaluations `k1..k4` are combined with weights
/// `(k1 + 2 k2 + 2 k3 + k4) / 6`.
pub const fn rk4_step(state: OscillatorState, params: &OscillatorParams) -> OscillatorState {
    let dt = params.dt;
    let half = dt / 2.0;

    let k1 = derivative(state.x, state.y, state.vx, state.vy, params);
    let k2 = derivative_offset(&state, &k1, half, params);
    let k3 = derivative_offset(&state, &k2, half, params);
    let k4 = derivative_offset(&state, &k3, dt, params);

    OscillatorState {
        x: state.x + blend(dt, k1.dx, k2.dx, k3.dx, k4.dx),
        y: state.y + blend(dt, k1.dy, k2.dy, k3.dy, k4.dy),
        vx: state.vx + blend(dt, k1.dvx, k2.dvx, k3.dvx, k4.dvx),
        vy: state.vy + blend(dt, k1.dvy, k2.dvy, k3.dvy, k4.dvy),
        t: state.t + dt,
    }
}

/// `dt / 6 * (a + 2b + 2c + d)`.
const fn blend(dt: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    dt / 6.0 * (a + 2.0 * b + 2.0 * c + d)
}
