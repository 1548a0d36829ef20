//! Per-slice loaders
//!
//! Each loader owns one slice of the dashboard state. The contract is the same
//! for all of them:
//! - No client or not connected: return without touching state or the network
//! - Raise the slice's loading flag (for slices that track one)
//! - Issue exactly one RPC call
//! - On success replace the slice with the response field (absent = empty)
//! - On failure reset the slice to its empty default and swallow the error
//! - Always clear the loading flag, including when the loader is cancelled
//!
//! `load_usage` is best-effort: a failure leaves the previous usage in place.

use serde::de::DeserializeOwned;
use serde_json::Value;
use teleview_core::{
    CostBreakdownEntry, ErrorEntry, LeaderboardDimension, LeaderboardEntry, Result, RpcClient,
    SessionSummary, SubagentTreeNode, TimelineEvent, UsageSummary,
    rpc::{self, METHOD_COSTS, METHOD_ERRORS, METHOD_SESSIONS, METHOD_TIMELINE, METHOD_TOP,
        METHOD_TREE, METHOD_USAGE},
};
use tracing::{debug, warn};

use crate::state::{SharedState, TelemetryState};

/// Slices with an individual loading flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadingSlice {
    Dashboard,
    Sessions,
    Costs,
    Timeline,
    Tree,
}

impl LoadingSlice {
    fn flag(self, state: &mut TelemetryState) -> &mut bool {
        match self {
            LoadingSlice::Dashboard => &mut state.loading,
            LoadingSlice::Sessions => &mut state.sessions_loading,
            LoadingSlice::Costs => &mut state.costs_loading,
            LoadingSlice::Timeline => &mut state.timeline_loading,
            LoadingSlice::Tree => &mut state.tree_loading,
        }
    }
}

/// Raises a loading flag and clears it when dropped
pub(crate) struct LoadingGuard<'a> {
    state: &'a SharedState,
    slice: LoadingSlice,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn raise(state: &'a SharedState, slice: LoadingSlice) -> Self {
        *slice.flag(&mut state.write()) = true;
        Self { state, slice }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.slice.flag(&mut self.state.write()) = false;
    }
}

/// Pull `field` out of a response as a list; absent or null means empty
fn take_list<T: DeserializeOwned>(mut response: Value, field: &str) -> Result<Vec<T>> {
    let value = response.get_mut(field).map(Value::take);
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Usage may come wrapped in `{ usage }` or bare
fn take_usage(mut response: Value) -> Result<UsageSummary> {
    let wrapped = response.get_mut("usage").map(Value::take);
    let payload = match wrapped {
        Some(value) if !value.is_null() => value,
        _ => response,
    };
    Ok(serde_json::from_value(payload)?)
}

async fn fetch_list<T: DeserializeOwned>(
    client: &dyn RpcClient,
    method: &str,
    params: Value,
    field: &str,
) -> Result<Vec<T>> {
    let response = client.request(method, params).await?;
    take_list(response, field)
}

/// Aggregated usage summary (`telemetry.usage`)
pub async fn load_usage(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };

    let result = match client.request(METHOD_USAGE, rpc::usage_params()).await {
        Ok(response) => take_usage(response),
        Err(e) => Err(e),
    };

    match result {
        Ok(usage) => state.write().usage = Some(usage),
        Err(e) => debug!("Usage unavailable, keeping previous summary: {}", e),
    }
}

/// Recent sessions (`telemetry.sessions`)
pub async fn load_sessions(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let limit = state.read().options.sessions_limit;
    let _loading = LoadingGuard::raise(state, LoadingSlice::Sessions);

    let result = fetch_list::<SessionSummary>(
        client.as_ref(),
        METHOD_SESSIONS,
        rpc::sessions_params(limit),
        "sessions",
    )
    .await;

    let sessions = result.unwrap_or_else(|e| {
        warn!("Failed to load {}: {}", METHOD_SESSIONS, e);
        Vec::new()
    });
    state.write().sessions = sessions;
}

/// Cost breakdown for the current grouping (`telemetry.costs`)
pub async fn load_costs(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let group_by = state.read().cost_group_by;
    let _loading = LoadingGuard::raise(state, LoadingSlice::Costs);

    let result = fetch_list::<CostBreakdownEntry>(
        client.as_ref(),
        METHOD_COSTS,
        rpc::costs_params(group_by),
        "costs",
    )
    .await;

    let costs = result.unwrap_or_else(|e| {
        warn!("Failed to load {} by {}: {}", METHOD_COSTS, group_by, e);
        Vec::new()
    });
    state.write().costs = costs;
}

async fn load_leaderboard(
    client: &dyn RpcClient,
    dimension: LeaderboardDimension,
) -> Vec<LeaderboardEntry> {
    fetch_list(client, METHOD_TOP, rpc::top_params(dimension), "leaderboard")
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load {} {}: {}", METHOD_TOP, dimension.as_str(), e);
            Vec::new()
        })
}

/// Most expensive models (`telemetry.top`, dimension `models`)
pub async fn load_top_models(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let leaderboard = load_leaderboard(client.as_ref(), LeaderboardDimension::Models).await;
    state.write().top_models = leaderboard;
}

/// Most used tools (`telemetry.top`, dimension `tools`)
pub async fn load_top_tools(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let leaderboard = load_leaderboard(client.as_ref(), LeaderboardDimension::Tools).await;
    state.write().top_tools = leaderboard;
}

/// Recent run and tool errors (`telemetry.errors`)
pub async fn load_errors(state: &SharedState) {
    let Some(client) = state.connected_client() else {
        return;
    };

    let result = fetch_list::<ErrorEntry>(
        client.as_ref(),
        METHOD_ERRORS,
        rpc::errors_params(),
        "errors",
    )
    .await;

    let errors = result.unwrap_or_else(|e| {
        warn!("Failed to load {}: {}", METHOD_ERRORS, e);
        Vec::new()
    });
    state.write().errors = errors;
}

/// Ordered event timeline for a session (`telemetry.timeline`)
pub async fn load_timeline(state: &SharedState, session_key: &str) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let _loading = LoadingGuard::raise(state, LoadingSlice::Timeline);

    let result = fetch_list::<TimelineEvent>(
        client.as_ref(),
        METHOD_TIMELINE,
        rpc::timeline_params(session_key),
        "events",
    )
    .await;

    let events = result.unwrap_or_else(|e| {
        warn!("Failed to load {} for {}: {}", METHOD_TIMELINE, session_key, e);
        Vec::new()
    });
    state.write().timeline = events.into();
}

/// Subagent hierarchy for a session (`telemetry.tree`)
pub async fn load_tree(state: &SharedState, session_key: &str) {
    let Some(client) = state.connected_client() else {
        return;
    };
    let _loading = LoadingGuard::raise(state, LoadingSlice::Tree);

    let result = fetch_list::<SubagentTreeNode>(
        client.as_ref(),
        METHOD_TREE,
        rpc::tree_params(session_key),
        "tree",
    )
    .await;

    let tree = result.unwrap_or_else(|e| {
        warn!("Failed to load {} for {}: {}", METHOD_TREE, session_key, e);
        Vec::new()
    });
    state.write().tree = tree;
}
