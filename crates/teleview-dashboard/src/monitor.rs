//! Active ("live") monitor
//!
//! A background task that re-runs the sessions loader on a fixed period while
//! the dashboard is in live mode.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::{loaders::load_sessions, state::SharedState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct ActiveMonitor {
    state: SharedState,
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ActiveMonitor {
    pub fn new(state: SharedState) -> Self {
        Self::with_period(state, DEFAULT_POLL_INTERVAL)
    }

    /// A zero period is replaced by the default
    pub fn with_period(state: SharedState, period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };
        Self {
            state,
            period,
            handle: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start polling; returns false if a monitor was already registered
    ///
    /// The first refresh happens one period after starting. Ticks never
    /// overlap: a slow load delays the next tick instead of stacking.
    pub fn start(&self) -> bool {
        let mut handle = self.lock();
        if handle.is_some() {
            debug!("Active monitor already running");
            return false;
        }

        self.state.write().active_monitor = true;

        let state = self.state.clone();
        let period = self.period;
        info!("Starting active monitor (interval: {:?})", period);

        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Active monitor tick");
                load_sessions(&state).await;
            }
        }));
        true
    }

    /// Stop polling; a no-op when nothing is running
    pub fn stop(&self) {
        let mut handle = self.lock();
        self.state.write().active_monitor = false;
        if let Some(task) = handle.take() {
            task.abort();
            info!("Active monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }
}

impl Drop for ActiveMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.lock().take() {
            task.abort();
        }
    }
}
