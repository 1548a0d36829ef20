//! Collector RPC surface
//!
//! The dashboard talks to the telemetry collector through a single generic
//! request/response call. Transports (HTTP, WebSocket, in-process fakes)
//! implement [`RpcClient`]; this module also pins the method names and the
//! request parameter shapes the collector expects.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    Result,
    types::{CostGroupBy, LeaderboardDimension},
};

pub const METHOD_USAGE: &str = "telemetry.usage";
pub const METHOD_SESSIONS: &str = "telemetry.sessions";
pub const METHOD_COSTS: &str = "telemetry.costs";
pub const METHOD_TOP: &str = "telemetry.top";
pub const METHOD_ERRORS: &str = "telemetry.errors";
pub const METHOD_TIMELINE: &str = "telemetry.timeline";
pub const METHOD_TREE: &str = "telemetry.tree";

/// Generic request/response client for the telemetry collector
///
/// # Example
/// ```no_run
/// # use teleview_core::rpc::{RpcClient, METHOD_SESSIONS, sessions_params};
/// # async fn example(client: &dyn RpcClient) -> teleview_core::Result<()> {
/// let response = client.request(METHOD_SESSIONS, sessions_params(50)).await?;
/// let sessions = response.get("sessions");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Issue one request and wait for its response payload
    ///
    /// # Errors
    /// - `Error::Rpc` when the collector reports a failure
    /// - `Error::Transport` / `Error::Timeout` for delivery problems
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

pub fn usage_params() -> Value {
    json!({})
}

pub fn sessions_params(limit: usize) -> Value {
    json!({ "limit": limit })
}

pub fn costs_params(group_by: CostGroupBy) -> Value {
    json!({ "groupBy": group_by.as_str() })
}

pub fn top_params(dimension: LeaderboardDimension) -> Value {
    json!({ "dimension": dimension.as_str() })
}

pub fn errors_params() -> Value {
    json!({})
}

pub fn timeline_params(session_key: &str) -> Value {
    json!({ "sessionKey": session_key })
}

pub fn tree_params(session_key: &str) -> Value {
    json!({ "sessionKey": session_key })
}
