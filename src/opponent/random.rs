//! Uniform random opponent.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

use crate::games::rps::Move;
use crate::opponent::{MoveSuggester, MoveSuggestion, SuggestionError};

/// Throws each move with equal probability. Never fails.
#[derive(Debug, Clone)]
pub struct RandomSuggester {
    name: String,
}

impl RandomSuggester {
    /// Creates a random opponent.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Draws a move.
    #[instrument(skip(self), fields(opponent = %self.name))]
    pub fn pick(&self) -> Move {
        let moves = Move::all();
        let mv = moves
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Move::Rock);
        debug!(%mv, "Picked random move");
        mv
    }
}

impl Default for RandomSuggester {
    fn default() -> Self {
        Self::new("Random")
    }
}

#[async_trait]
impl MoveSuggester for RandomSuggester {
    async fn suggest(&self, _history: &[Move]) -> Result<MoveSuggestion, SuggestionError> {
        Ok(MoveSuggestion::new(self.pick(), "Picked at random.".to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
