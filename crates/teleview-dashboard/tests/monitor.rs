//! Active monitor tests (paused clock)

mod common;

use common::FakeCollector;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use teleview_dashboard::{ActiveMonitor, SharedState};
use tokio::time::sleep;

fn monitored() -> (Arc<FakeCollector>, SharedState, ActiveMonitor) {
    let (fake, client) = FakeCollector::new()
        .respond("telemetry.sessions", json!({ "sessions": [{ "key": "live" }] }))
        .into_client();
    let state = SharedState::default();
    state.connect(client);
    let monitor = ActiveMonitor::new(state.clone());
    (fake, state, monitor)
}

#[tokio::test(start_paused = true)]
async fn test_monitor_polls_sessions_every_period() {
    let (fake, state, monitor) = monitored();

    assert!(monitor.start());
    assert!(state.read().active_monitor);

    sleep(Duration::from_millis(4_900)).await;
    assert!(fake.calls_to("telemetry.sessions").is_empty());

    sleep(Duration::from_millis(200)).await;
    assert_eq!(fake.calls_to("telemetry.sessions").len(), 1);
    assert_eq!(state.read().sessions[0].key, "live");

    sleep(Duration::from_secs(5)).await;
    assert_eq!(fake.calls_to("telemetry.sessions").len(), 2);

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let (fake, _state, monitor) = monitored();

    assert!(monitor.start());
    assert!(!monitor.start());
    assert!(!monitor.start());

    sleep(Duration::from_millis(5_100)).await;
    assert_eq!(
        fake.calls_to("telemetry.sessions").len(),
        1,
        "repeated starts must not stack intervals"
    );

    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_polling() {
    let (fake, state, monitor) = monitored();

    monitor.start();
    sleep(Duration::from_millis(5_100)).await;
    monitor.stop();

    assert!(!state.read().active_monitor);
    assert!(!monitor.is_running());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(fake.calls_to("telemetry.sessions").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_without_monitor_is_noop() {
    let (fake, state, monitor) = monitored();

    monitor.stop();
    monitor.stop();

    assert!(!state.read().active_monitor);
    assert!(!monitor.is_running());
    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
    let (fake, _state, monitor) = monitored();

    monitor.start();
    monitor.stop();
    assert!(monitor.start());

    sleep(Duration::from_millis(5_100)).await;
    assert_eq!(fake.calls_to("telemetry.sessions").len(), 1);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_custom_period() {
    let (fake, client) = FakeCollector::new().into_client();
    let state = SharedState::default();
    state.connect(client);
    let monitor = ActiveMonitor::with_period(state, Duration::from_secs(1));

    monitor.start();
    sleep(Duration::from_millis(3_500)).await;

    assert_eq!(fake.calls_to("telemetry.sessions").len(), 3);
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_zero_period_falls_back_to_default() {
    let monitor = ActiveMonitor::with_period(SharedState::default(), Duration::ZERO);
    assert_eq!(monitor.period(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_monitor_stops_polling() {
    let (fake, _state, monitor) = monitored();

    monitor.start();
    drop(monitor);

    sleep(Duration::from_secs(20)).await;
    assert!(fake.calls().is_empty());
}
