//! Game configuration loaded from TOML.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::llm_client::{LlmConfig, LlmProvider};
use crate::room::PlayerId;
use crate::store::{MemoryStore, RoomStore, SqliteStore, StoreError};

/// Which shared room store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process store; both players must share the process.
    Memory,
    /// SQLite file; any process that opens the same file shares the rooms.
    #[default]
    Sqlite,
}

/// Configuration for a game client.
///
/// Every field has a default, so an empty file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// Name shown for this player.
    #[serde(default = "default_player_name")]
    player_name: String,

    /// Stable identity, so a restarted client can reconnect to its seat.
    /// A fresh one is generated per run when unset.
    #[serde(default)]
    #[setters(strip_option)]
    player_id: Option<String>,

    /// Room store backend.
    #[serde(default)]
    backend: BackendKind,

    /// Database file for the SQLite backend.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// How often SQLite subscriptions poll for changes.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Wins needed to take a game.
    #[serde(default = "default_target_score")]
    target_score: u32,

    /// LLM provider for the single-player opponent.
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name.
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// How long to wait for the opponent before playing a random move.
    #[serde(default = "default_suggestion_timeout_ms")]
    suggestion_timeout_ms: u64,
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_db_path() -> String {
    "rps_dueler.db".to_string()
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_target_score() -> u32 {
    3
}

fn default_provider() -> LlmProvider {
    LlmProvider::Anthropic
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_suggestion_timeout_ms() -> u64 {
    10_000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            player_id: None,
            backend: BackendKind::default(),
            db_path: default_db_path(),
            poll_interval_ms: default_poll_interval_ms(),
            target_score: default_target_score(),
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            suggestion_timeout_ms: default_suggestion_timeout_ms(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or fails
    /// validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(player = %config.player_name, backend = ?config.backend, "Config loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`GameConfig::from_file`] when the file exists.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or invalid values.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_score == 0 {
            return Err(ConfigError::new("target_score must be at least 1".to_string()));
        }
        if self.poll_interval_ms < 10 {
            return Err(ConfigError::new("poll_interval_ms must be at least 10".to_string()));
        }
        if self.suggestion_timeout_ms == 0 {
            return Err(ConfigError::new("suggestion_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// The configured identity, or a fresh random one.
    pub fn player_identity(&self) -> PlayerId {
        self.player_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(PlayerId::from)
            .unwrap_or_else(PlayerId::generate)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Suggestion timeout as a [`Duration`].
    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_millis(self.suggestion_timeout_ms)
    }

    /// Opens the configured room store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the SQLite database cannot be opened.
    #[instrument(skip(self), fields(backend = ?self.backend))]
    pub fn open_store(&self) -> Result<Arc<dyn RoomStore>, StoreError> {
        match self.backend {
            BackendKind::Memory => Ok(Arc::new(MemoryStore::new())),
            BackendKind::Sqlite => Ok(Arc::new(SqliteStore::open(
                self.db_path.clone(),
                self.poll_interval(),
            )?)),
        }
    }

    /// Creates the LLM configuration for the single-player opponent.
    /// Requires `OPENAI_API_KEY` or `ANTHROPIC_API_KEY` in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the provider's key is not set.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.llm_provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
