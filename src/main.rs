//! RPS Dueler - terminal client
//!
//! Host or join a room over the configured store, play hot-seat at one
//! terminal, or play the computer.

#![warn(missing_docs)]

mod cli;
mod terminal;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rps_dueler::GameConfig;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli)?;

    match cli.command {
        Command::Host => terminal::run_online(&config, None).await,
        Command::Join { code } => terminal::run_online(&config, Some(code)).await,
        Command::Local => terminal::run_local(&config).await,
        Command::Solo { random } => terminal::run_solo(&config, random).await,
    }
}

/// Applies command-line overrides on top of the config file.
#[instrument(skip(cli), fields(config_path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = GameConfig::load_or_default(&cli.config)?;

    if let Some(backend) = cli.backend {
        info!(?backend, "Overriding backend");
        config = config.with_backend(backend.into());
    }
    if let Some(db_path) = &cli.db_path {
        info!(db_path = %db_path, "Overriding database path");
        config = config.with_db_path(db_path.clone());
    }
    if let Some(player_id) = &cli.player_id {
        config = config.with_player_id(player_id.clone());
    }
    if let Some(target_score) = cli.target_score {
        config = config.with_target_score(target_score);
    }

    config.validate()?;
    Ok(config)
}

/// Logs go to stderr so they never interleave with the game prompt.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
