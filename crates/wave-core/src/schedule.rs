//! Shutdown signalling and the fixed-interval task scheduler.
//!
//! Every background loop in the engine is a [`run_periodic`] call sharing
//! one [`Shutdown`]. Ticks of a single loop never overlap: the next tick
//! is only awaited after the previous body has finished. A shutdown
//! observed between ticks ends the loop; a tick already in progress runs
//! to completion.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Process-wide stop flag shared between the loops and the signal handler.
///
/// Wrap in [`Arc`](std::sync::Arc) to share. Triggering is idempotent.
#[derive(Debug, Default)]
pub struct Shutdown {
    /// Whether a stop has been requested.
    triggered: AtomicBool,

    /// Wakes every task parked in [`Shutdown::cancelled`].
    notify: Notify,
}

impl Shutdown {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake all waiters.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn cancelled(&self) {
        // Register before checking the flag so a concurrent trigger is not lost.
        let notified = self.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}

/// Run `tick` every `period` until `shutdown` is triggered.
///
/// The first tick fires immediately. If a tick overruns the period the
/// next one is delayed rather than fired in a burst, so the cadence stays
/// fixed relative to the end of the slow tick.
///
/// # Panics
///
/// Panics if `period` is zero; configuration validation rejects that.
pub async fn run_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    shutdown: &Shutdown,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(task = name, period_ms = period.as_millis(), "Periodic task started");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = interval.tick() => {
                debug!(task = name, "Tick");
                tick().await;
            }
        }
    }

    info!(task = name, "Periodic task stopped");
}
