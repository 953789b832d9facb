//! The move suggestion service interface.

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use tracing::{instrument, warn};

use crate::games::rps::Move;

/// A move proposed by an opponent, with its stated reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct MoveSuggestion {
    /// The proposed move.
    mv: Move,
    /// Human-readable rationale.
    rationale: String,
}

/// Something that proposes the opponent's next move.
#[async_trait]
pub trait MoveSuggester: Send + Sync {
    /// Suggests a move given the human's moves so far, oldest first.
    async fn suggest(&self, history: &[Move]) -> Result<MoveSuggestion, SuggestionError>;

    /// Display name of this opponent.
    fn name(&self) -> &str;
}

/// The suggestion service could not produce a move.
#[derive(Debug, Clone, Display, Error)]
#[display("Suggestion service unavailable: {} at {}:{}", message, file, line)]
pub struct SuggestionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SuggestionError {
    /// Creates a new suggestion error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        warn!(error_message = %message, "Suggestion failed");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
