//! Teleview Session Replay
//!
//! Timestamp-driven playback over a recorded session timeline:
//! - Pure step and delay computation (`schedule`)
//! - The timer-owning `ReplayController`
//! - Category filtering of timelines before playback

pub mod controller;
pub mod filter;
pub mod schedule;

pub use controller::{ReplayController, UpdateCallback};
pub use filter::filter_events;
pub use schedule::{MAX_STEP_DELAY, MIN_STEP_DELAY, Step, next_step, step_delay};
