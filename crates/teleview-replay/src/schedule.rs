//! Playback step computation
//!
//! Given the timeline and the state a playback chain is carrying, decide what
//! happens next. Kept free of timers so the controller's behavior can be
//! tested without a runtime.

use std::time::Duration;
use teleview_core::{ReplayState, TimelineEvent};

/// Lower bound on the gap between two events (before speed scaling)
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(50);

/// Upper bound on the gap between two events (before speed scaling)
pub const MAX_STEP_DELAY: Duration = Duration::from_millis(3000);

/// What a playback chain does after its current position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Paused before the end; nothing to schedule
    Idle,
    /// Emit this terminal state immediately and stop scheduling
    Finish(ReplayState),
    /// Wait `delay`, then emit `next` and continue from it
    Advance { delay: Duration, next: ReplayState },
}

/// Compute the next step for a playback chain
pub fn next_step(events: &[TimelineEvent], state: &ReplayState) -> Step {
    let len = events.len();

    if !state.playing || state.current_index >= len {
        if state.current_index >= len {
            return Step::Finish(ReplayState {
                playing: false,
                ..*state
            });
        }
        return Step::Idle;
    }

    let next_index = state.current_index + 1;
    if next_index >= len {
        // The last event is already visible at len - 1; this step marks completion
        return Step::Finish(ReplayState {
            playing: false,
            current_index: len,
            ..*state
        });
    }

    Step::Advance {
        delay: step_delay(&events[state.current_index], &events[next_index], state.speed),
        next: ReplayState {
            current_index: next_index,
            ..*state
        },
    }
}

/// Real-time gap between two adjacent events, clamped and scaled by `speed`
///
/// Unparseable timestamps fall back to the minimum delay so playback always
/// makes progress.
pub fn step_delay(current: &TimelineEvent, next: &TimelineEvent, speed: f64) -> Duration {
    let raw_ms = match (current.timestamp_millis(), next.timestamp_millis()) {
        (Some(from), Some(to)) => (to - from) as f64,
        _ => f64::NAN,
    };

    let clamped_ms = clamp_delay_ms(raw_ms);
    let scaled_ms = clamped_ms / speed;

    if scaled_ms.is_finite() && scaled_ms >= 0.0 {
        millis_to_duration(scaled_ms)
    } else {
        millis_to_duration(clamped_ms)
    }
}

fn millis_to_duration(ms: f64) -> Duration {
    Duration::from_micros((ms * 1000.0).round() as u64)
}

fn clamp_delay_ms(raw_ms: f64) -> f64 {
    let min = MIN_STEP_DELAY.as_millis() as f64;
    let max = MAX_STEP_DELAY.as_millis() as f64;
    if raw_ms.is_nan() {
        return min;
    }
    raw_ms.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(id: &str, ms: i64) -> TimelineEvent {
        let ts = iso_at(ms);
        TimelineEvent {
            id: id.to_string(),
            timestamp: ts,
            kind: "tool.call".to_string(),
            ..Default::default()
        }
    }

    // 2025-01-01T00:00:00Z plus an offset below one hour
    fn iso_at(offset_ms: i64) -> String {
        let minutes = offset_ms / 60_000;
        let seconds = (offset_ms % 60_000) / 1000;
        let millis = offset_ms % 1000;
        format!("2025-01-01T00:{:02}:{:02}.{:03}Z", minutes, seconds, millis)
    }

    fn playing_at(index: usize) -> ReplayState {
        ReplayState {
            playing: true,
            speed: 1.0,
            current_index: index,
        }
    }

    #[test]
    fn test_delay_uses_timestamp_gap() {
        let delay = step_delay(&event_at("a", 0), &event_at("b", 1000), 1.0);
        assert_eq!(delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_clamped_to_maximum() {
        let delay = step_delay(&event_at("a", 1000), &event_at("b", 5000), 1.0);
        assert_eq!(delay, MAX_STEP_DELAY);
    }

    #[test]
    fn test_delay_clamped_to_minimum() {
        let same = step_delay(&event_at("a", 1000), &event_at("b", 1000), 1.0);
        assert_eq!(same, MIN_STEP_DELAY);

        let backwards = step_delay(&event_at("a", 2000), &event_at("b", 1000), 1.0);
        assert_eq!(backwards, MIN_STEP_DELAY);
    }

    #[test]
    fn test_delay_malformed_timestamp_uses_minimum() {
        let mut broken = event_at("b", 1000);
        broken.timestamp = "not-a-date".to_string();
        let delay = step_delay(&event_at("a", 0), &broken, 1.0);
        assert_eq!(delay, MIN_STEP_DELAY);
    }

    #[test]
    fn test_delay_scaled_by_speed() {
        let fast = step_delay(&event_at("a", 0), &event_at("b", 1000), 2.0);
        assert_eq!(fast, Duration::from_millis(500));

        let slow = step_delay(&event_at("a", 0), &event_at("b", 1000), 0.5);
        assert_eq!(slow, Duration::from_millis(2000));

        // Scaling happens after clamping
        let capped = step_delay(&event_at("a", 0), &event_at("b", 60_000), 4.0);
        assert_eq!(capped, Duration::from_millis(750));
    }

    #[test]
    fn test_delay_invalid_speed_falls_back_to_unscaled() {
        let delay = step_delay(&event_at("a", 0), &event_at("b", 1000), 0.0);
        assert_eq!(delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_next_step_advances() {
        let events = vec![event_at("a", 0), event_at("b", 1000), event_at("c", 5000)];

        assert_eq!(
            next_step(&events, &playing_at(0)),
            Step::Advance {
                delay: Duration::from_millis(1000),
                next: playing_at(1),
            }
        );
        assert_eq!(
            next_step(&events, &playing_at(1)),
            Step::Advance {
                delay: Duration::from_millis(3000),
                next: playing_at(2),
            }
        );
    }

    #[test]
    fn test_next_step_finishes_after_last_event() {
        let events = vec![event_at("a", 0), event_at("b", 1000), event_at("c", 5000)];
        assert_eq!(
            next_step(&events, &playing_at(2)),
            Step::Finish(ReplayState {
                playing: false,
                speed: 1.0,
                current_index: 3,
            })
        );
    }

    #[test]
    fn test_next_step_paused_mid_timeline_is_idle() {
        let events = vec![event_at("a", 0), event_at("b", 1000)];
        let paused = ReplayState {
            playing: false,
            ..playing_at(0)
        };
        assert_eq!(next_step(&events, &paused), Step::Idle);
    }

    #[test]
    fn test_next_step_past_end_normalizes_playing() {
        let events = vec![event_at("a", 0), event_at("b", 1000)];
        assert_eq!(
            next_step(&events, &playing_at(7)),
            Step::Finish(ReplayState {
                playing: false,
                speed: 1.0,
                current_index: 7,
            })
        );
    }
}
