//! Computer opponents for single-player mode.

mod llm;
mod random;
mod solo;
mod suggestion;

pub use llm::LlmSuggester;
pub use random::RandomSuggester;
pub use solo::{SoloMatch, SoloRound};
pub use suggestion::{MoveSuggester, MoveSuggestion, SuggestionError};
