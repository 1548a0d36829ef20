//! Telemetry data model
//!
//! Everything here is produced by the collector and read-only to the client,
//! except [`ReplayState`], which is owned by the dashboard and written through
//! the replay controller's update callback. Responses are untrusted, so every
//! field tolerates absence and falls back to an empty/neutral default.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single recorded event on a session timeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEvent {
    /// Unique within a session
    pub id: String,
    /// ISO-8601 timestamp as delivered by the collector
    pub timestamp: String,
    /// Dot-namespaced category, e.g. `run.start`, `tool.call`, `llm.call`, `error`
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    /// Duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl TimelineEvent {
    /// Parse the timestamp into epoch milliseconds
    ///
    /// Accepts RFC 3339 and offset-less ISO-8601 (read as UTC). Returns `None`
    /// for anything else.
    pub fn timestamp_millis(&self) -> Option<i64> {
        let raw = self.timestamp.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.timestamp_millis());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().timestamp_millis())
    }

    /// Category prefix of the kind (`tool.call` -> `tool`, `error` -> `error`)
    pub fn category(&self) -> &str {
        self.kind.split('.').next().unwrap_or_default()
    }
}

/// Playback cursor over a timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayState {
    pub playing: bool,
    /// Positive playback multiplier
    pub speed: f64,
    /// In `[0, N]`; `N` means fully played
    pub current_index: usize,
}

impl ReplayState {
    pub const DEFAULT_SPEED: f64 = 1.0;

    /// Whether the cursor has consumed every event
    pub fn is_finished(&self, event_count: usize) -> bool {
        self.current_index >= event_count
    }
}

impl Default for ReplayState {
    fn default() -> Self {
        Self {
            playing: false,
            speed: Self::DEFAULT_SPEED,
            current_index: 0,
        }
    }
}

/// Aggregated token/cost summary across all sessions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageSummary {
    pub total_sessions: u64,
    pub total_runs: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
    pub error_count: u64,
}

/// Per-session counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSummary {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub run_count: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub error_count: u64,
    pub last_activity: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// Dimension used to group cost breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostGroupBy {
    #[default]
    Model,
    Provider,
    Day,
    Session,
}

impl CostGroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostGroupBy::Model => "model",
            CostGroupBy::Provider => "provider",
            CostGroupBy::Day => "day",
            CostGroupBy::Session => "session",
        }
    }
}

impl fmt::Display for CostGroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostGroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(CostGroupBy::Model),
            "provider" => Ok(CostGroupBy::Provider),
            "day" => Ok(CostGroupBy::Day),
            "session" => Ok(CostGroupBy::Session),
            other => Err(format!(
                "Invalid cost grouping '{}'. Use 'model', 'provider', 'day' or 'session'",
                other
            )),
        }
    }
}

/// One row of a cost breakdown
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostBreakdownEntry {
    pub label: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub cache_cost: f64,
    pub total_cost: f64,
}

/// Leaderboard dimensions understood by `telemetry.top`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardDimension {
    Runs,
    Tools,
    Models,
    Sessions,
}

impl LeaderboardDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardDimension::Runs => "runs",
            LeaderboardDimension::Tools => "tools",
            LeaderboardDimension::Models => "models",
            LeaderboardDimension::Sessions => "sessions",
        }
    }
}

/// Leaderboard row; `value` is contextual to the dimension
/// (cost for models, count for tools/sessions, tokens for runs)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardEntry {
    pub label: String,
    pub value: f64,
    pub count: u64,
}

/// Error recorded by a run or tool call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorEntry {
    pub timestamp: String,
    pub source: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

/// Node of the subagent forest for a session
///
/// Cycles are not guarded against; the collector builds the tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubagentTreeNode {
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_agent_id: Option<String>,
    pub children: Vec<SubagentTreeNode>,
}

impl SubagentTreeNode {
    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// Total node count of a forest
pub fn forest_size(roots: &[SubagentTreeNode]) -> usize {
    roots.iter().map(SubagentTreeNode::node_count).sum()
}
