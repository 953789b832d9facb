//! Command-line interface for rps_dueler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rps_dueler::BackendKind;

/// RPS Dueler - rock-paper-scissors over a shared room store
#[derive(Parser, Debug)]
#[command(name = "rps_dueler")]
#[command(about = "Rock-paper-scissors rooms with an LLM opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "rps_dueler.toml")]
    pub config: PathBuf,

    /// Override the room store backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// Override the SQLite database file
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Override the player identity (reuse it to reconnect to a seat)
    #[arg(long, global = true)]
    pub player_id: Option<String>,

    /// Override the wins needed to take a game
    #[arg(long, global = true)]
    pub target_score: Option<u32>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Backend choices on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// In-process store
    Memory,
    /// SQLite database file
    Sqlite,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => BackendKind::Memory,
            BackendArg::Sqlite => BackendKind::Sqlite,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a room and wait for an opponent
    Host,

    /// Join a room by its code
    Join {
        /// Room code shown to the host
        code: String,
    },

    /// Two players taking turns at one terminal
    Local,

    /// Play against the computer
    Solo {
        /// Use the random opponent even when an API key is available
        #[arg(long)]
        random: bool,
    },
}
