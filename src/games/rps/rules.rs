//! Round resolution.

use super::types::{Move, Outcome};
use tracing::{instrument, trace};

/// Resolves a round from the perspective of `a`.
#[instrument(level = "trace")]
pub fn resolve(a: Move, b: Move) -> Outcome {
    let outcome = if a == b {
        Outcome::Draw
    } else if a.beats() == b {
        Outcome::Win
    } else {
        Outcome::Lose
    };
    trace!(?outcome, "Round resolved");
    outcome
}

/// Resolves a round for both seats at once.
///
/// The second outcome is always the inverse of the first so the two
/// players can never be told contradictory results.
#[instrument(level = "trace")]
pub fn resolve_pair(player1: Move, player2: Move) -> (Outcome, Outcome) {
    let first = resolve(player1, player2);
    (first, first.inverse())
}
