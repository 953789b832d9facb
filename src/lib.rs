//! RPS Dueler library - rock-paper-scissors rooms over a shared store
//!
//! Two clients play a best-of match by reading and writing one shared room
//! record. Neither client is authoritative: every write is a guarded update,
//! and the round/game fence makes round resolution happen exactly once no
//! matter who attempts it.
//!
//! # Architecture
//!
//! - **Games**: the pure move resolver
//! - **Room**: the session state machine and the derived per-client view
//! - **Store**: the shared room store trait, with in-memory and SQLite backends
//! - **Opponent**: single-player matches against an LLM or random suggester
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rps_dueler::{MemoryStore, Move, PlayerId, RoomSession, RoomStore};
//!
//! # async fn example() -> Result<(), rps_dueler::RoomError> {
//! let store: Arc<dyn RoomStore> = Arc::new(MemoryStore::new());
//! let mut host = RoomSession::new(store.clone(), PlayerId::generate(), 3);
//! let mut guest = RoomSession::new(store, PlayerId::generate(), 3);
//!
//! let code = host.create_room().await?;
//! guest.join_room(code.as_str()).await?;
//! host.submit_move(Move::Rock).await?;
//! guest.submit_move(Move::Scissors).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod llm_client;
mod opponent;
mod room;
mod store;

// Crate-level exports - Configuration
pub use config::{BackendKind, ConfigError, GameConfig};

// Crate-level exports - Game rules
pub use games::rps::{Move, Outcome, resolve, resolve_pair};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Opponents
pub use opponent::{
    LlmSuggester, MoveSuggester, MoveSuggestion, RandomSuggester, SoloMatch, SoloRound,
    SuggestionError,
};

// Crate-level exports - Rooms
pub use room::{
    Ack, CODE_LEN, Notice, Observation, Phase, PlayerId, Resolution, Room, RoomError, RoomId,
    RoomSession, RoomStatus, RoomView, Seat,
};

// Crate-level exports - Stores
pub use store::{
    Condition, DEFAULT_POLL_INTERVAL, Guard, MemoryStore, RoomPatch, RoomStore, RoomWatch,
    SqliteStore, StoreError, StoreErrorKind, UpdateOutcome,
};
