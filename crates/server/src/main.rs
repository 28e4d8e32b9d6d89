mod avatars;
mod bootstrap;
mod service;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use namegame_core::config::{AppConfig, ConfigOverrides, LoadOptions};

/// Slack bot that quizzes you on your coworkers' names.
#[derive(Debug, Parser)]
#[command(name = "namegame-server", version)]
struct Args {
    /// Path to the config file (defaults to namegame.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level override (trace|debug|info|warn|error).
    #[arg(long)]
    log_level: Option<String>,

    /// Minimum size of a detected face.
    #[arg(long)]
    min_face_size: Option<u32>,

    /// Maximum size of a detected face.
    #[arg(long)]
    max_face_size: Option<u32>,

    /// Shift detection window by percentage.
    #[arg(long)]
    shift_factor: Option<f64>,

    /// Scale detection window by percentage.
    #[arg(long)]
    scale_factor: Option<f64>,
}

impl Args {
    fn load_options(self) -> LoadOptions {
        LoadOptions {
            config_path: self.config,
            require_file: false,
            overrides: ConfigOverrides {
                bot_token: None,
                log_level: self.log_level,
                min_face_size: self.min_face_size,
                max_face_size: self.max_face_size,
                shift_factor: self.shift_factor,
                scale_factor: self.scale_factor,
            },
        }
    }
}

fn init_logging(config: &AppConfig) {
    use namegame_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(args.load_options())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config, bootstrap::Collaborators::default()).await?;

    tracing::info!(
        event_name = "system.server.transport_mode",
        transport_mode = if app.live_transport { "rtm" } else { "noop" },
        eligible_profiles = app.directory.len(),
        "rtm runner transport mode initialized"
    );

    app.runner.start().await?;

    tracing::info!(event_name = "system.server.started", "namegame-server started");
    wait_for_shutdown().await?;
    tracing::info!(event_name = "system.server.stopping", "namegame-server stopping");

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
