//! Telemetry controller
//!
//! The intent-level surface front-ends drive. It wires the replay controller's
//! update callback into the shared state and owns the active monitor.
//!
//! Lock discipline: the state lock is never held while calling into the replay
//! controller, because the replay callback takes the state write lock.

use std::sync::Arc;
use teleview_core::{CostGroupBy, ReplayState, RpcClient, TimelineEvent};
use teleview_replay::ReplayController;
use tokio::sync::watch;
use tracing::debug;

use crate::{
    loaders::load_costs,
    monitor::ActiveMonitor,
    orchestrator::{load_dashboard, load_session_detail},
    state::{DashboardOptions, SharedState, TelemetryState, TelemetryView},
};

pub struct TelemetryController {
    state: SharedState,
    replay: ReplayController,
    replay_tx: watch::Sender<ReplayState>,
    monitor: ActiveMonitor,
}

impl TelemetryController {
    pub fn new(options: DashboardOptions) -> Self {
        let poll_interval = options.poll_interval;
        let state = SharedState::new(TelemetryState::with_options(options));

        let (replay_tx, _) = watch::channel(ReplayState::default());
        let sink = state.clone();
        let notify = replay_tx.clone();
        let replay = ReplayController::new(move |next| {
            sink.write().replay = next;
            notify.send_replace(next);
        });
        let monitor = ActiveMonitor::with_period(state.clone(), poll_interval);

        Self {
            state,
            replay,
            replay_tx,
            monitor,
        }
    }

    /// Controller with a client attached and connected
    pub fn connected(client: Arc<dyn RpcClient>, options: DashboardOptions) -> Self {
        let controller = Self::new(options);
        controller.state.connect(client);
        controller
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn snapshot(&self) -> TelemetryState {
        self.state.snapshot()
    }

    /// Receiver for replay transitions, latest value wins
    pub fn replay_updates(&self) -> watch::Receiver<ReplayState> {
        self.replay_tx.subscribe()
    }

    pub fn connect(&self, client: Arc<dyn RpcClient>) {
        self.state.connect(client);
    }

    pub fn disconnect(&self) {
        self.state.disconnect();
    }

    pub async fn refresh(&self) {
        load_dashboard(&self.state).await;
    }

    /// Regroup the cost breakdown and reload it
    pub async fn set_cost_group_by(&self, group_by: CostGroupBy) {
        self.state.write().cost_group_by = group_by;
        load_costs(&self.state).await;
    }

    /// Open the detail view for a session, stopping any replay in progress
    pub async fn select_session(&self, session_key: &str) {
        self.replay.stop();
        load_session_detail(&self.state, session_key).await;
    }

    pub fn back_to_overview(&self) {
        self.replay.stop();
        let mut state = self.state.write();
        state.view = TelemetryView::Overview;
        state.replay = ReplayState {
            playing: false,
            ..state.replay
        };
    }

    fn replay_input(&self) -> (Arc<[TimelineEvent]>, ReplayState) {
        let state = self.state.read();
        (Arc::clone(&state.timeline), state.replay)
    }

    pub fn play(&self) -> ReplayState {
        let (events, current) = self.replay_input();
        self.replay.start(&events, current)
    }

    pub fn pause(&self) -> ReplayState {
        let (_, current) = self.replay_input();
        self.replay.pause(current)
    }

    pub fn toggle_play_pause(&self) -> ReplayState {
        let (events, current) = self.replay_input();
        self.replay.toggle_play_pause(&events, current)
    }

    /// Jump to an event; indexes past the end are clamped to the end
    pub fn seek(&self, index: usize) -> ReplayState {
        let (events, current) = self.replay_input();
        self.replay.seek(index.min(events.len()), current)
    }

    pub fn set_speed(&self, speed: f64) -> ReplayState {
        let (events, current) = self.replay_input();
        self.replay.set_speed(speed, &events, current)
    }

    pub fn start_active_monitor(&self) -> bool {
        self.monitor.start()
    }

    pub fn stop_active_monitor(&self) {
        self.monitor.stop();
    }

    /// Flip live mode; returns whether the monitor is now running
    pub fn toggle_live(&self) -> bool {
        if self.monitor.is_running() {
            self.monitor.stop();
            false
        } else {
            self.monitor.start();
            true
        }
    }

    /// Cancel replay and polling
    pub fn shutdown(&self) {
        debug!("Shutting down telemetry controller");
        self.replay.stop();
        self.monitor.stop();
    }
}
