//! Single-player match against a move suggester.

use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::games::rps::{Move, Outcome, resolve};
use crate::opponent::{MoveSuggester, MoveSuggestion, RandomSuggester};

/// One played round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoloRound {
    /// Round number within the game.
    pub round: u32,
    /// The human's move.
    pub human: Move,
    /// The opponent's move.
    pub opponent: Move,
    /// Outcome for the human.
    pub outcome: Outcome,
    /// The opponent's stated reasoning.
    pub rationale: String,
    /// Whether the move came from the random fallback.
    pub fell_back: bool,
}

/// A first-to-N match against a [`MoveSuggester`].
///
/// The suggester never blocks the match: errors and timeouts fall back to
/// a uniformly random move.
pub struct SoloMatch {
    suggester: Box<dyn MoveSuggester>,
    fallback: RandomSuggester,
    timeout: Duration,
    history: Vec<Move>,
    human_score: u32,
    opponent_score: u32,
    target_score: u32,
    round: u32,
}

impl std::fmt::Debug for SoloMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoloMatch")
            .field("opponent", &self.suggester.name())
            .field("score", &(self.human_score, self.opponent_score))
            .field("target_score", &self.target_score)
            .field("round", &self.round)
            .finish()
    }
}

impl SoloMatch {
    /// Starts a match to `target_score` wins.
    #[instrument(skip(suggester), fields(opponent = %suggester.name()))]
    pub fn new(suggester: Box<dyn MoveSuggester>, target_score: u32, timeout: Duration) -> Self {
        info!(target_score, "Starting solo match");
        Self {
            suggester,
            fallback: RandomSuggester::default(),
            timeout,
            history: Vec::new(),
            human_score: 0,
            opponent_score: 0,
            target_score: target_score.max(1),
            round: 1,
        }
    }

    /// Name of the opponent.
    pub fn opponent_name(&self) -> &str {
        self.suggester.name()
    }

    /// `(human, opponent)` scores.
    pub fn score(&self) -> (u32, u32) {
        (self.human_score, self.opponent_score)
    }

    /// Score that ends the game.
    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    /// Round about to be played.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The human's moves so far, across games.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Whether someone reached the target score.
    pub fn is_over(&self) -> bool {
        self.human_score.max(self.opponent_score) >= self.target_score
    }

    /// Whether the human won the match, once it is over.
    pub fn human_won(&self) -> Option<bool> {
        self.is_over().then(|| self.human_score >= self.target_score)
    }

    /// Plays one round. Returns `None` once the game is over.
    #[instrument(skip(self), fields(opponent = %self.suggester.name(), round = self.round))]
    pub async fn play(&mut self, human: Move) -> Option<SoloRound> {
        if self.is_over() {
            return None;
        }

        let (suggestion, fell_back) = self.opponent_move().await;
        let opponent = *suggestion.mv();
        let outcome = resolve(human, opponent);
        match outcome {
            Outcome::Win => self.human_score += 1,
            Outcome::Lose => self.opponent_score += 1,
            Outcome::Draw => {}
        }
        self.history.push(human);

        let played = SoloRound {
            round: self.round,
            human,
            opponent,
            outcome,
            rationale: suggestion.rationale().clone(),
            fell_back,
        };
        self.round += 1;

        info!(
            %human,
            %opponent,
            %outcome,
            score = %format!("{}-{}", self.human_score, self.opponent_score),
            fell_back,
            "Solo round played"
        );
        Some(played)
    }

    /// Resets scores and rounds. History is kept so the opponent keeps
    /// learning across games.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        info!("New solo game");
        self.human_score = 0;
        self.opponent_score = 0;
        self.round = 1;
    }

    async fn opponent_move(&self) -> (MoveSuggestion, bool) {
        match tokio::time::timeout(self.timeout, self.suggester.suggest(&self.history)).await {
            Ok(Ok(suggestion)) => (suggestion, false),
            Ok(Err(e)) => {
                warn!(error = %e, "Opponent unavailable, playing a random move");
                (self.random_fallback(), true)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Opponent timed out, playing a random move"
                );
                (self.random_fallback(), true)
            }
        }
    }

    fn random_fallback(&self) -> MoveSuggestion {
        MoveSuggestion::new(
            self.fallback.pick(),
            "The strategist was unavailable, so this one was random.".to_string(),
        )
    }
}
