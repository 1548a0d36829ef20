//! Dashboard and session-detail orchestration

use futures::future::join_all;
use std::future::Future;
use teleview_core::ReplayState;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{
    errors::join_error_message,
    loaders::{
        LoadingGuard, LoadingSlice, load_costs, load_errors, load_sessions, load_timeline,
        load_top_models, load_top_tools, load_tree, load_usage,
    },
    state::{SharedState, TelemetryView},
};

fn spawn_loader<F, Fut>(state: &SharedState, loader: F) -> JoinHandle<()>
where
    F: FnOnce(SharedState) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(loader(state.clone()))
}

/// Refresh every overview slice
///
/// The six loaders run as separate tasks and are all in flight before any of
/// them is awaited. Loader failures are absorbed per slice; only a loader task
/// that dies outright (panic or cancellation) sets the dashboard-level error.
pub async fn load_dashboard(state: &SharedState) {
    if state.connected_client().is_none() {
        debug!("Skipping dashboard load: not connected");
        return;
    }

    state.write().error = None;
    let _loading = LoadingGuard::raise(state, LoadingSlice::Dashboard);

    let tasks = vec![
        spawn_loader(state, |s| async move { load_usage(&s).await }),
        spawn_loader(state, |s| async move { load_sessions(&s).await }),
        spawn_loader(state, |s| async move { load_costs(&s).await }),
        spawn_loader(state, |s| async move { load_top_models(&s).await }),
        spawn_loader(state, |s| async move { load_top_tools(&s).await }),
        spawn_loader(state, |s| async move { load_errors(&s).await }),
    ];

    let failure = join_all(tasks)
        .await
        .into_iter()
        .find_map(|joined| joined.err());

    if let Some(err) = failure {
        let message = join_error_message(err);
        error!("Dashboard load failed: {}", message);
        state.write().error = Some(message);
    }
}

/// Switch to the detail view for `session_key` and load its timeline and tree
///
/// The view switch, selection and replay reset are applied before any request
/// goes out, and apply even when disconnected.
pub async fn load_session_detail(state: &SharedState, session_key: &str) {
    {
        let mut s = state.write();
        s.selected_session_key = Some(session_key.to_string());
        s.view = TelemetryView::SessionDetail;
        s.replay = ReplayState::default();
    }

    tokio::join!(load_timeline(state, session_key), load_tree(state, session_key));
}
