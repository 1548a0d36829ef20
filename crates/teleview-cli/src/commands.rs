//! Command handlers

use anyhow::{Result, bail};
use std::time::Duration;
use teleview_core::CostGroupBy;
use teleview_dashboard::{TelemetryController, loaders::load_sessions};
use teleview_replay::filter_events;
use tokio::signal;
use tracing::{debug, info};

use crate::render;

pub async fn dashboard(controller: &TelemetryController) -> Result<()> {
    controller.refresh().await;
    let snapshot = controller.snapshot();
    print!("{}", render::overview(&snapshot));
    if let Some(error) = snapshot.error {
        bail!("dashboard load failed: {}", error);
    }
    Ok(())
}

pub async fn sessions(controller: &TelemetryController) -> Result<()> {
    load_sessions(controller.state()).await;
    print!("{}", render::sessions(&controller.snapshot().sessions));
    Ok(())
}

pub async fn costs(controller: &TelemetryController, group_by: CostGroupBy) -> Result<()> {
    controller.set_cost_group_by(group_by).await;
    let snapshot = controller.snapshot();
    print!("{}", render::costs(&snapshot.costs, snapshot.cost_group_by));
    Ok(())
}

pub async fn session(controller: &TelemetryController, key: &str) -> Result<()> {
    controller.select_session(key).await;
    print!("{}", render::session_detail(&controller.snapshot()));
    Ok(())
}

/// Play a session's timeline, printing each event as the cursor reaches it
pub async fn replay(
    controller: &TelemetryController,
    key: &str,
    speed: f64,
    kinds: &[String],
) -> Result<()> {
    controller.select_session(key).await;

    let events = {
        let mut state = controller.state().write();
        let filtered = filter_events(&state.timeline, kinds);
        state.timeline = filtered.clone();
        filtered
    };
    if events.is_empty() {
        println!("No events to replay for {}", key);
        return Ok(());
    }

    info!("Replaying {} events at {}x", events.len(), speed);
    let mut updates = controller.replay_updates();
    controller.set_speed(speed);
    controller.play();

    let mut printed = 0;
    loop {
        let current = *updates.borrow_and_update();
        let visible = (current.current_index + 1).min(events.len());
        while printed < visible {
            println!("{}", render::event(printed, events.len(), &events[printed]));
            printed += 1;
        }
        if current.is_finished(events.len()) && !current.playing {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                debug!("Interrupted, stopping replay");
                controller.shutdown();
                break;
            }
        }
    }

    println!("Replay finished ({}/{} events)", printed, events.len());
    Ok(())
}

/// Poll sessions with the active monitor, reprinting on change until Ctrl-C
pub async fn watch(controller: &TelemetryController) -> Result<()> {
    load_sessions(controller.state()).await;
    let mut shown = controller.snapshot().sessions;
    print!("{}", render::sessions(&shown));

    controller.start_active_monitor();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = controller.snapshot();
                if !snapshot.sessions_loading && snapshot.sessions != shown {
                    println!();
                    print!("{}", render::sessions(&snapshot.sessions));
                    shown = snapshot.sessions;
                }
            }
            _ = signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
        }
    }

    controller.shutdown();
    Ok(())
}
