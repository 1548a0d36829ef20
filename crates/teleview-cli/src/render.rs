//! Plain-text rendering of dashboard state

use std::fmt::Write;
use teleview_core::{
    CostBreakdownEntry, CostGroupBy, ErrorEntry, LeaderboardEntry, SessionSummary,
    SubagentTreeNode, TimelineEvent, UsageSummary, forest_size,
};
use teleview_dashboard::TelemetryState;

pub fn usage(usage: Option<&UsageSummary>) -> String {
    match usage {
        Some(u) => format!(
            "Sessions: {}  Runs: {}  Tokens: {}  Cost: ${:.4}  Errors: {}\n",
            u.total_sessions, u.total_runs, u.total_tokens, u.estimated_cost, u.error_count
        ),
        None => "Usage: unavailable\n".to_string(),
    }
}

pub fn sessions(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return "No sessions\n".to_string();
    }

    let mut out = format!(
        "{:<40} {:>6} {:>10} {:>10} {:>6}  {}\n",
        "SESSION", "RUNS", "TOKENS", "COST", "ERRORS", "LAST ACTIVITY"
    );
    for s in sessions {
        let _ = writeln!(
            out,
            "{:<40} {:>6} {:>10} {:>10.4} {:>6}  {}",
            s.key,
            s.run_count,
            s.total_tokens,
            s.total_cost,
            s.error_count,
            s.last_activity.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn costs(costs: &[CostBreakdownEntry], group_by: CostGroupBy) -> String {
    if costs.is_empty() {
        return format!("No costs by {}\n", group_by);
    }

    let mut out = format!(
        "{:<32} {:>12} {:>12} {:>10}\n",
        group_by.as_str().to_uppercase(),
        "INPUT TOK",
        "OUTPUT TOK",
        "TOTAL"
    );
    for c in costs {
        let _ = writeln!(
            out,
            "{:<32} {:>12} {:>12} {:>10.4}",
            c.label, c.input_tokens, c.output_tokens, c.total_cost
        );
    }
    let total: f64 = costs.iter().map(|c| c.total_cost).sum();
    let _ = writeln!(out, "{:<32} {:>12} {:>12} {:>10.4}", "total", "", "", total);
    out
}

pub fn leaderboard(title: &str, entries: &[LeaderboardEntry]) -> String {
    let mut out = format!("{}\n", title);
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for (rank, e) in entries.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<30} {:>10.4} ({})", rank + 1, e.label, e.value, e.count);
    }
    out
}

pub fn errors(errors: &[ErrorEntry]) -> String {
    if errors.is_empty() {
        return "No recent errors\n".to_string();
    }
    let mut out = String::from("Recent errors\n");
    for e in errors {
        let _ = writeln!(out, "  {} [{}] {}", e.timestamp, e.source, e.message);
    }
    out
}

pub fn overview(state: &TelemetryState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {}\n", error);
    }
    out.push_str(&usage(state.usage.as_ref()));
    out.push('\n');
    out.push_str(&sessions(&state.sessions));
    out.push('\n');
    out.push_str(&costs(&state.costs, state.cost_group_by));
    out.push('\n');
    out.push_str(&leaderboard("Top models", &state.top_models));
    out.push_str(&leaderboard("Top tools", &state.top_tools));
    out.push('\n');
    out.push_str(&errors(&state.errors));
    out
}

/// One timeline row, prefixed with its position
pub fn event(index: usize, total: usize, event: &TimelineEvent) -> String {
    let mut line = format!(
        "[{:>width$}/{}] {} {:<16}",
        index + 1,
        total,
        event.timestamp,
        event.kind,
        width = total.to_string().len()
    );
    if let Some(ms) = event.duration {
        let _ = write!(line, " {:.0}ms", ms);
    }
    if let Some(data) = &event.data {
        if let Some(summary) = ["tool", "model", "message", "error"]
            .iter()
            .find_map(|key| data.get(*key).and_then(|v| v.as_str()))
        {
            let _ = write!(line, " {}", summary);
        }
    }
    line
}

pub fn tree(roots: &[SubagentTreeNode]) -> String {
    fn walk(node: &SubagentTreeNode, depth: usize, out: &mut String) {
        let _ = writeln!(
            out,
            "{}- {}{}",
            "  ".repeat(depth),
            node.agent_id,
            node.session_key
                .as_deref()
                .map(|key| format!(" ({})", key))
                .unwrap_or_default()
        );
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    if roots.is_empty() {
        return "No subagents\n".to_string();
    }
    let mut out = format!("Subagents ({})\n", forest_size(roots));
    for root in roots {
        walk(root, 0, &mut out);
    }
    out
}

pub fn session_detail(state: &TelemetryState) -> String {
    let mut out = format!(
        "Session {}\n\n",
        state.selected_session_key.as_deref().unwrap_or("-")
    );
    if state.timeline.is_empty() {
        out.push_str("No events\n");
    } else {
        for (i, e) in state.timeline.iter().enumerate() {
            out.push_str(&event(i, state.timeline.len(), e));
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(&tree(&state.tree));
    out
}
