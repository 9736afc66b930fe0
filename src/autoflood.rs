use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::simulation::Simulation;

pub type SharedSimulation = Arc<Mutex<Simulation>>;

struct Running {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<u64>,
}

/// Runs `next_turn` on a fixed wall-clock interval until stopped.
///
/// Turns go through the same mutex as every other caller, so an auto-flood
/// turn never overlaps a manual one.
pub struct AutoFlood {
    simulation: SharedSimulation,
    running: Option<Running>,
}

impl AutoFlood {
    pub fn new(simulation: SharedSimulation) -> Self {
        Self {
            simulation,
            running: None,
        }
    }

    pub fn simulation(&self) -> &SharedSimulation {
        &self.simulation
    }

    /// True while the timer task is alive. A task that ended on a turn error
    /// no longer counts.
    pub fn is_flooding(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Starts the timer. The first turn runs one `interval` from now.
    ///
    /// Returns false, and changes nothing, if the timer is already running
    /// or the interval is zero. Must be called inside a tokio runtime.
    pub fn start(&mut self, interval: Duration) -> bool {
        self.spawn(interval, None)
    }

    /// Like `start`, but the timer ends on its own after `turns` turns.
    pub fn start_limited(&mut self, interval: Duration, turns: u64) -> bool {
        self.spawn(interval, Some(turns))
    }

    fn spawn(&mut self, interval: Duration, limit: Option<u64>) -> bool {
        if self.is_flooding() {
            tracing::debug!(target: "tides::autoflood", "auto-flood already running");
            return false;
        }
        if interval.is_zero() {
            tracing::warn!(target: "tides::autoflood", "auto-flood interval must be non-zero");
            return false;
        }

        let (stop, mut stop_rx) = oneshot::channel::<()>();
        let simulation = Arc::clone(&self.simulation);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut turns = 0u64;
            while limit.map_or(true, |limit| turns < limit) {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let mut simulation = simulation.lock().await;
                        if let Err(err) = simulation.next_turn() {
                            tracing::warn!(
                                target: "tides::autoflood",
                                error = %err,
                                "auto-flood turn failed, stopping"
                            );
                            break;
                        }
                        turns += 1;
                    }
                }
            }
            turns
        });

        tracing::info!(
            target: "tides::autoflood",
            interval_ms = interval.as_millis() as u64,
            limit = ?limit,
            "auto-flood started"
        );
        self.running = Some(Running { stop, handle });
        true
    }

    /// Stops the timer and waits for the task to exit, so no turn runs after
    /// this returns. Yields the number of turns the task ran, or `None` if
    /// nothing was running.
    pub async fn stop(&mut self) -> Option<u64> {
        let running = self.running.take()?;
        // The task may already have exited on its own.
        let _ = running.stop.send(());
        match running.handle.await {
            Ok(turns) => {
                tracing::info!(target: "tides::autoflood", turns, "auto-flood stopped");
                Some(turns)
            }
            Err(err) => {
                tracing::error!(target: "tides::autoflood", error = %err, "auto-flood task aborted");
                None
            }
        }
    }
}
