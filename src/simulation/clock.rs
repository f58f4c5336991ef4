//! Background stepper
//!
//! `SimulationClock` moves a [`Simulation`] onto a dedicated thread that steps
//! it at most `target_rate` times per second, independent of how often the
//! foreground renders. After every completed step (and after every reset or
//! pause change) the stepper publishes an immutable [`Snapshot`]; readers
//! only ever see the most recent published copy, never the live bodies.
//!
//! The live simulation sits behind a mutex that is held for one step, one
//! reset, or one pause change at a time, never across the polling loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::configuration::config::EngineConfig;
use crate::configuration::error::SimError;
use crate::simulation::engine::{Simulation, StepOutcome};
use crate::simulation::snapshot::Snapshot;

/// Observable state of the background stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Running, // stepping at the target rate
    Paused,  // polling, steps are no-ops
    Stopped, // shut down on request
    Halted,  // stopped by a failed step or a panic
}

/// Pacing for the stepper thread
#[derive(Debug, Clone, Copy)]
pub struct ClockSettings {
    pub target_rate: f64,        // steps per second
    pub poll_interval: Duration, // longest sleep between polls
}

impl ClockSettings {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            target_rate: cfg.target_rate,
            poll_interval: Duration::from_millis(cfg.poll_interval_ms.max(1)),
        }
    }

    /// Minimum wall-clock time between two steps
    /// Fails for rates that are not positive or whose period overflows a `Duration`
    pub fn step_period(&self) -> Result<Duration, SimError> {
        let invalid = SimError::InvalidParameter { name: "target_rate", value: self.target_rate };
        if !(self.target_rate.is_finite() && self.target_rate > 0.0) {
            return Err(invalid);
        }
        Duration::try_from_secs_f64(self.target_rate.recip()).map_err(|_| invalid)
    }
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

struct Shared {
    live: Mutex<Simulation>,
    published: RwLock<Arc<Snapshot>>,
    running: AtomicBool,
    halted: AtomicBool,
    paused: AtomicBool,
}

impl Shared {
    // A step never leaves partial state behind, so a poisoned lock is still usable
    fn lock_live(&self) -> MutexGuard<'_, Simulation> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    fn step_once(&self) -> Result<StepOutcome, SimError> {
        let mut sim = self.lock_live();
        let outcome = sim.step()?;
        if outcome == StepOutcome::Advanced {
            self.publish(sim.snapshot());
        }
        Ok(outcome)
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }
}

/// Handle to a simulation stepping on its own thread
pub struct SimulationClock {
    shared: Arc<Shared>,
    settings: ClockSettings,
    handle: Option<JoinHandle<()>>,
}

impl SimulationClock {
    /// Publish the initial snapshot and start stepping
    pub fn spawn(sim: Simulation, settings: ClockSettings) -> Result<Self, SimError> {
        let period = settings.step_period()?;

        let paused = sim.is_paused();
        let shared = Arc::new(Shared {
            published: RwLock::new(Arc::new(sim.snapshot())),
            live: Mutex::new(sim),
            running: AtomicBool::new(true),
            halted: AtomicBool::new(false),
            paused: AtomicBool::new(paused),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("orbsim-stepper".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| poll_loop(&worker, period, settings.poll_interval)));
                if result.is_err() {
                    error!("stepper panicked, halting");
                    worker.halt();
                }
            })?;

        info!(target_rate = settings.target_rate, "stepper started");
        Ok(Self {
            shared,
            settings,
            handle: Some(handle),
        })
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let published = self.shared.published.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*published)
    }

    pub fn status(&self) -> ClockStatus {
        if self.shared.halted.load(Ordering::Acquire) {
            ClockStatus::Halted
        } else if !self.shared.running.load(Ordering::Acquire) {
            ClockStatus::Stopped
        } else if self.shared.paused.load(Ordering::Acquire) {
            ClockStatus::Paused
        } else {
            ClockStatus::Running
        }
    }

    pub fn settings(&self) -> ClockSettings {
        self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        let mut sim = self.shared.lock_live();
        sim.set_paused(paused);
        self.shared.paused.store(paused, Ordering::Release);
        self.shared.publish(sim.snapshot());
    }

    /// Flip pause and return the new value
    pub fn toggle_pause(&self) -> bool {
        let mut sim = self.shared.lock_live();
        let paused = sim.toggle_pause();
        self.shared.paused.store(paused, Ordering::Release);
        self.shared.publish(sim.snapshot());
        info!(paused, "pause toggled");
        paused
    }

    /// Regenerate the bodies and clear time, excluding any step in progress
    ///
    /// The snapshot is replaced even when the generator fails, so readers see
    /// the emptied state together with the returned error.
    pub fn reset(&self) -> Result<(), SimError> {
        let mut sim = self.shared.lock_live();
        let result = sim.reset();
        self.shared.publish(sim.snapshot());
        result
    }

    /// Run `f` against the live simulation between steps
    pub fn with_simulation<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(&self.shared.lock_live())
    }

    /// Request the stepper to stop and wait for it
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("stepper thread ended with a panic");
            }
            info!("stepper shut down");
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(shared: &Shared, period: Duration, poll_interval: Duration) {
    let mut last_step = Instant::now();

    while shared.running.load(Ordering::Acquire) {
        let elapsed = last_step.elapsed();
        if elapsed < period {
            thread::sleep((period - elapsed).min(poll_interval));
            continue;
        }

        match shared.step_once() {
            // a paused tick still moves the reference, so resuming never catches up
            Ok(StepOutcome::Advanced) | Ok(StepOutcome::Paused) => last_step = Instant::now(),
            Err(err) => {
                error!(%err, "step failed, halting stepper");
                shared.halt();
                return;
            }
        }
    }
}
