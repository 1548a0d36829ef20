//! Teleview Dashboard
//!
//! Client-side orchestration for the telemetry dashboard:
//! - Shared dashboard state with per-slice loading flags
//! - Per-slice loaders with failure isolation
//! - Dashboard and session-detail orchestrators
//! - The polling active monitor
//! - `TelemetryController`, the intent-level facade used by front-ends

pub mod controller;
pub mod errors;
pub mod loaders;
pub mod monitor;
pub mod orchestrator;
pub mod state;

pub use controller::TelemetryController;
pub use errors::{FALLBACK_ERROR_MESSAGE, error_message, join_error_message, panic_message};
pub use monitor::{ActiveMonitor, DEFAULT_POLL_INTERVAL};
pub use orchestrator::{load_dashboard, load_session_detail};
pub use state::{DashboardOptions, SharedState, TelemetryState, TelemetryView};
