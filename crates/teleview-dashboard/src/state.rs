//! Shared dashboard state
//!
//! One `TelemetryState` lives for the lifetime of a dashboard. Loaders overwrite
//! the slices they own in place; nothing is ever partially merged. The state is
//! shared behind `Arc<RwLock<_>>` and locks are never held across an `.await`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use teleview_core::{
    CostBreakdownEntry, CostGroupBy, ErrorEntry, LeaderboardEntry, ReplayState, RpcClient,
    SessionSummary, SubagentTreeNode, TimelineEvent, UsageSummary,
};

/// Which dashboard view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TelemetryView {
    #[default]
    Overview,
    SessionDetail,
}

/// Tunables for the loaders and the active monitor
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// `limit` sent with `telemetry.sessions`
    pub sessions_limit: usize,
    /// Period of the active monitor
    pub poll_interval: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            sessions_limit: 50,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Everything the dashboard renders
#[derive(Clone, Default)]
pub struct TelemetryState {
    pub connected: bool,
    pub client: Option<Arc<dyn RpcClient>>,
    pub options: DashboardOptions,

    // Dashboard-wide
    pub loading: bool,
    pub error: Option<String>,

    // Overview slices
    pub usage: Option<UsageSummary>,
    pub sessions: Vec<SessionSummary>,
    pub sessions_loading: bool,
    pub costs: Vec<CostBreakdownEntry>,
    pub cost_group_by: CostGroupBy,
    pub costs_loading: bool,
    pub top_models: Vec<LeaderboardEntry>,
    pub top_tools: Vec<LeaderboardEntry>,
    pub errors: Vec<ErrorEntry>,

    // Session detail
    pub view: TelemetryView,
    pub selected_session_key: Option<String>,
    pub timeline: Arc<[TimelineEvent]>,
    pub timeline_loading: bool,
    pub tree: Vec<SubagentTreeNode>,
    pub tree_loading: bool,
    pub replay: ReplayState,

    /// Active monitor running
    pub active_monitor: bool,
}

impl std::fmt::Debug for TelemetryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryState")
            .field("connected", &self.connected)
            .field("has_client", &self.client.is_some())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("sessions", &self.sessions.len())
            .field("costs", &self.costs.len())
            .field("cost_group_by", &self.cost_group_by)
            .field("view", &self.view)
            .field("selected_session_key", &self.selected_session_key)
            .field("timeline", &self.timeline.len())
            .field("tree", &self.tree.len())
            .field("replay", &self.replay)
            .field("active_monitor", &self.active_monitor)
            .finish()
    }
}

impl TelemetryState {
    pub fn with_options(options: DashboardOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// The client, if one is attached and the connection is up
    pub fn connected_client(&self) -> Option<Arc<dyn RpcClient>> {
        match (&self.client, self.connected) {
            (Some(client), true) => Some(Arc::clone(client)),
            _ => None,
        }
    }
}

/// Cheaply cloneable handle to the dashboard state
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<TelemetryState>>,
}

impl SharedState {
    pub fn new(state: TelemetryState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TelemetryState> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TelemetryState> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clone the current state for rendering
    pub fn snapshot(&self) -> TelemetryState {
        self.read().clone()
    }

    /// Attach a client and mark the connection up
    pub fn connect(&self, client: Arc<dyn RpcClient>) {
        let mut state = self.write();
        state.client = Some(client);
        state.connected = true;
    }

    /// Mark the connection down; the client handle is kept for reconnects
    pub fn disconnect(&self) {
        self.write().connected = false;
    }

    pub fn connected_client(&self) -> Option<Arc<dyn RpcClient>> {
        self.read().connected_client()
    }
}
