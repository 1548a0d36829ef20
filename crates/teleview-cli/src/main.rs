//! Teleview CLI
//!
//! Terminal front-end for the telemetry dashboard and session replay.

mod commands;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use teleview_core::{CostGroupBy, RpcClient};
use teleview_dashboard::TelemetryController;
use teleview_gateway::HttpRpcClient;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::TeleviewConfig;

#[derive(Parser)]
#[command(name = "teleview")]
#[command(about = "Agent telemetry dashboard and session replay", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "TELEVIEW_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Gateway base URL
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// Bearer token for the gateway
    #[arg(long, value_name = "TOKEN", global = true)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the full dashboard once and print a summary
    Dashboard,
    /// List recent sessions
    Sessions {
        /// Maximum number of sessions to fetch
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the cost breakdown
    Costs {
        /// Grouping dimension (model, provider, day, session)
        #[arg(long, value_name = "DIMENSION")]
        group_by: Option<CostGroupBy>,
    },
    /// Show a session's timeline and subagent tree
    Session {
        /// Session key
        key: String,
    },
    /// Replay a session's timeline in real time
    Replay {
        /// Session key
        key: String,

        /// Playback speed multiplier
        #[arg(long)]
        speed: Option<f64>,

        /// Only replay these event categories (e.g. tool,llm)
        #[arg(long, value_delimiter = ',')]
        kinds: Vec<String>,
    },
    /// Follow recent sessions live until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        TeleviewConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Environment overrides the file, flags override both
    config.merge_env();
    if let Some(url) = &cli.url {
        config.gateway.url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.gateway.token = Some(token.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if let Commands::Sessions { limit: Some(limit) } = &cli.command {
        config.dashboard.sessions_limit = *limit;
    }

    config.validate()?;
    init_tracing(&config)?;

    debug!("Using gateway {}{}", config.gateway.url, config.gateway.rpc_path);
    let client: Arc<dyn RpcClient> = Arc::new(
        HttpRpcClient::new(config.gateway_config()).context("creating gateway client")?,
    );
    let controller = TelemetryController::connected(client, config.dashboard_options());
    controller.state().write().cost_group_by = config.dashboard.cost_group_by;

    let result = match cli.command {
        Commands::Dashboard => commands::dashboard(&controller).await,
        Commands::Sessions { .. } => commands::sessions(&controller).await,
        Commands::Costs { group_by } => {
            let group_by = group_by.unwrap_or(config.dashboard.cost_group_by);
            commands::costs(&controller, group_by).await
        }
        Commands::Session { key } => commands::session(&controller, &key).await,
        Commands::Replay { key, speed, kinds } => {
            let speed = speed.unwrap_or(config.replay.default_speed);
            commands::replay(&controller, &key, speed, &kinds).await
        }
        Commands::Watch => commands::watch(&controller).await,
    };

    controller.shutdown();
    info!("Done");
    result
}

fn init_tracing(config: &TeleviewConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::new(format!("{}", log_level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
