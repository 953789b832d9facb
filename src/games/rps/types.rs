//! Core domain types for rock-paper-scissors.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;

/// A hand a player can throw.
///
/// Parsing is case-insensitive and also accepts the first letter
/// (`"r"`, `"p"`, `"s"`), which is what the terminal client reads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Move {
    /// Crushes scissors.
    #[strum(to_string = "Rock", serialize = "r")]
    Rock,
    /// Covers rock.
    #[strum(to_string = "Paper", serialize = "p")]
    Paper,
    /// Cuts paper.
    #[strum(to_string = "Scissors", serialize = "s")]
    Scissors,
}

impl Move {
    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }

    /// The move that defeats this one.
    pub fn loses_to(self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }

    /// All three moves in table order.
    #[instrument]
    pub fn all() -> Vec<Move> {
        Move::iter().collect()
    }
}

/// Result of a round from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Outcome {
    /// This player won the round.
    Win,
    /// This player lost the round.
    Lose,
    /// Both threw the same move.
    Draw,
}

impl Outcome {
    /// The same round seen from the other side of the table.
    pub fn inverse(self) -> Self {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    /// Message shown to the player this outcome belongs to.
    pub fn headline(self) -> &'static str {
        match self {
            Outcome::Win => "You Win!",
            Outcome::Lose => "You Lose!",
            Outcome::Draw => "It's a Draw!",
        }
    }
}
