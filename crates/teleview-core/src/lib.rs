//! Teleview Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Teleview:
//! - Telemetry data model (timeline events, sessions, costs, leaderboards)
//! - Replay state shared by the replay controller and the dashboard
//! - The `RpcClient` transport abstraction and collector method names
//! - Core error types

pub mod error;
pub mod rpc;
pub mod types;

pub use error::{Error, Result};
pub use rpc::RpcClient;
pub use types::{
    CostBreakdownEntry, CostGroupBy, ErrorEntry, LeaderboardDimension, LeaderboardEntry,
    ReplayState, SessionSummary, SubagentTreeNode, TimelineEvent, UsageSummary, forest_size,
};
