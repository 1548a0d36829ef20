//! Replay Controller
//!
//! Drives a cursor through an ordered timeline, mimicking the real-time pacing
//! of the recorded session. The controller never stores the replay state: every
//! mutator takes the caller's current state and returns the next one. Advancement
//! happens on a single background playback task that carries its own copy of
//! the state and reports each step through the update callback.
//!
//! Cancellation discipline:
//! - Every mutator cancels the pending playback task before anything else
//!   (`set_speed` only when playing, since nothing is pending otherwise)
//! - At most one playback task exists per controller
//! - A cancelled task can never emit: emissions check a generation counter under
//!   the same mutex that cancellation bumps it under
//!
//! Every state a mutator returns is also delivered through the callback, under
//! the same mutex as the playback task's emissions, so the callback observes one
//! totally ordered sequence of states.

use std::sync::{Arc, Mutex, MutexGuard};
use teleview_core::{ReplayState, TimelineEvent};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::schedule::{Step, next_step};

/// Receives every state transition
pub type UpdateCallback = Arc<dyn Fn(ReplayState) + Send + Sync>;

struct Timer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    timer: Mutex<Timer>,
    on_update: UpdateCallback,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Timer> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver `state` unless the chain identified by `generation` was cancelled
    fn emit_if_current(&self, generation: u64, state: ReplayState) -> bool {
        let timer = self.lock();
        if timer.generation != generation {
            return false;
        }
        (self.on_update)(state);
        true
    }
}

/// Timestamp-driven playback state machine
pub struct ReplayController {
    shared: Arc<Shared>,
}

impl ReplayController {
    /// Create a controller reporting transitions to `on_update`
    ///
    /// The callback runs while the controller's internal lock is held, so it
    /// must not call back into the controller.
    pub fn new(on_update: impl Fn(ReplayState) + Send + Sync + 'static) -> Self {
        Self::with_callback(Arc::new(on_update))
    }

    pub fn with_callback(on_update: UpdateCallback) -> Self {
        Self {
            shared: Arc::new(Shared {
                timer: Mutex::new(Timer {
                    generation: 0,
                    handle: None,
                }),
                on_update,
            }),
        }
    }

    /// Begin (or restart) playback
    ///
    /// An empty timeline is a no-op returning `state` unchanged. Starting at or
    /// past the end rewinds to the first event. Must be called from within a
    /// Tokio runtime.
    pub fn start(&self, events: &Arc<[TimelineEvent]>, state: ReplayState) -> ReplayState {
        if events.is_empty() {
            return state;
        }

        let mut timer = self.shared.lock();
        cancel_locked(&mut timer);

        let mut next = ReplayState {
            playing: true,
            ..state
        };
        if next.current_index >= events.len() {
            next.current_index = 0;
        }

        (self.shared.on_update)(next);
        self.arm_locked(&mut timer, Arc::clone(events), next);
        next
    }

    /// Stop advancing, keeping the cursor where it is
    pub fn pause(&self, state: ReplayState) -> ReplayState {
        let mut timer = self.shared.lock();
        cancel_locked(&mut timer);

        let next = ReplayState {
            playing: false,
            ..state
        };
        (self.shared.on_update)(next);
        next
    }

    pub fn toggle_play_pause(
        &self,
        events: &Arc<[TimelineEvent]>,
        state: ReplayState,
    ) -> ReplayState {
        if state.playing {
            self.pause(state)
        } else {
            self.start(events, state)
        }
    }

    /// Jump to `index`; seeking always pauses
    pub fn seek(&self, index: usize, state: ReplayState) -> ReplayState {
        let mut timer = self.shared.lock();
        cancel_locked(&mut timer);

        let next = ReplayState {
            playing: false,
            current_index: index,
            ..state
        };
        (self.shared.on_update)(next);
        next
    }

    /// Change the playback multiplier
    ///
    /// While playing, the pending step is re-armed at the new speed right away.
    /// Non-finite or non-positive speeds are rejected and `state` is returned
    /// unchanged.
    pub fn set_speed(
        &self,
        speed: f64,
        events: &Arc<[TimelineEvent]>,
        state: ReplayState,
    ) -> ReplayState {
        if !speed.is_finite() || speed <= 0.0 {
            warn!("Ignoring invalid replay speed {}", speed);
            return state;
        }

        let mut timer = self.shared.lock();
        let next = ReplayState { speed, ..state };

        if state.playing {
            cancel_locked(&mut timer);
            (self.shared.on_update)(next);
            self.arm_locked(&mut timer, Arc::clone(events), next);
        } else {
            (self.shared.on_update)(next);
        }
        next
    }

    /// Cancel any pending playback without emitting anything
    pub fn stop(&self) {
        let mut timer = self.shared.lock();
        cancel_locked(&mut timer);
    }

    /// Whether a playback task is currently pending
    pub fn is_scheduled(&self) -> bool {
        self.shared
            .lock()
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn arm_locked(&self, timer: &mut Timer, events: Arc<[TimelineEvent]>, state: ReplayState) {
        let generation = timer.generation;
        let shared = Arc::clone(&self.shared);
        debug!(
            "Arming replay at index {} of {} (speed {}x)",
            state.current_index,
            events.len(),
            state.speed
        );
        timer.handle = Some(tokio::spawn(run_playback(
            shared, generation, events, state,
        )));
    }
}

impl Drop for ReplayController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn cancel_locked(timer: &mut Timer) {
    timer.generation = timer.generation.wrapping_add(1);
    if let Some(handle) = timer.handle.take() {
        if !handle.is_finished() {
            debug!("Cancelling pending replay step");
        }
        handle.abort();
    }
}

async fn run_playback(
    shared: Arc<Shared>,
    generation: u64,
    events: Arc<[TimelineEvent]>,
    mut state: ReplayState,
) {
    loop {
        match next_step(&events, &state) {
            Step::Idle => return,
            Step::Finish(done) => {
                if shared.emit_if_current(generation, done) {
                    debug!("Replay finished at index {}", done.current_index);
                }
                return;
            }
            Step::Advance { delay, next } => {
                tokio::time::sleep(delay).await;
                if !shared.emit_if_current(generation, next) {
                    return;
                }
                state = next;
            }
        }
    }
}
