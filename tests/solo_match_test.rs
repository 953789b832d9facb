//! Tests for single-player matches and the LLM reply parser.

use std::time::Duration;

use async_trait::async_trait;

use rps_dueler::{
    LlmSuggester, Move, MoveSuggester, MoveSuggestion, Outcome, RandomSuggester, SoloMatch,
    SuggestionError,
};

const TIMEOUT: Duration = Duration::from_millis(200);

/// Always throws the same move.
struct Stubborn(Move);

#[async_trait]
impl MoveSuggester for Stubborn {
    async fn suggest(&self, _history: &[Move]) -> Result<MoveSuggestion, SuggestionError> {
        Ok(MoveSuggestion::new(self.0, "Always the same.".to_string()))
    }

    fn name(&self) -> &str {
        "Stubborn"
    }
}

/// Never answers.
struct Broken;

#[async_trait]
impl MoveSuggester for Broken {
    async fn suggest(&self, _history: &[Move]) -> Result<MoveSuggestion, SuggestionError> {
        Err(SuggestionError::new("Service down"))
    }

    fn name(&self) -> &str {
        "Broken"
    }
}

/// Answers too late.
struct Sleepy;

#[async_trait]
impl MoveSuggester for Sleepy {
    async fn suggest(&self, _history: &[Move]) -> Result<MoveSuggestion, SuggestionError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(MoveSuggestion::new(Move::Rock, "Finally.".to_string()))
    }

    fn name(&self) -> &str {
        "Sleepy"
    }
}

#[tokio::test]
async fn test_rounds_score_and_record_history() {
    let mut game = SoloMatch::new(Box::new(Stubborn(Move::Rock)), 3, TIMEOUT);

    let round = game.play(Move::Paper).await.expect("Game should be open");
    assert_eq!(round.round, 1);
    assert_eq!(round.opponent, Move::Rock);
    assert_eq!(round.outcome, Outcome::Win);
    assert!(!round.fell_back);
    assert_eq!(round.rationale, "Always the same.");

    let round = game.play(Move::Scissors).await.expect("Game should be open");
    assert_eq!(round.outcome, Outcome::Lose);
    let round = game.play(Move::Rock).await.expect("Game should be open");
    assert_eq!(round.outcome, Outcome::Draw);

    assert_eq!(game.score(), (1, 1));
    assert_eq!(game.round(), 4);
    assert_eq!(game.history(), [Move::Paper, Move::Scissors, Move::Rock]);
}

#[tokio::test]
async fn test_match_ends_at_target() {
    let mut game = SoloMatch::new(Box::new(Stubborn(Move::Scissors)), 2, TIMEOUT);
    assert_eq!(game.human_won(), None);

    game.play(Move::Rock).await.expect("Game should be open");
    assert!(!game.is_over());
    game.play(Move::Rock).await.expect("Game should be open");

    assert!(game.is_over());
    assert_eq!(game.human_won(), Some(true));
    assert!(game.play(Move::Rock).await.is_none(), "No rounds after game over");
    assert_eq!(game.score(), (2, 0));
}

#[tokio::test]
async fn test_new_game_keeps_history() {
    let mut game = SoloMatch::new(Box::new(Stubborn(Move::Paper)), 1, TIMEOUT);
    game.play(Move::Rock).await.expect("Game should be open");
    assert_eq!(game.human_won(), Some(false));

    game.new_game();
    assert!(!game.is_over());
    assert_eq!(game.score(), (0, 0));
    assert_eq!(game.round(), 1);
    assert_eq!(game.history(), [Move::Rock]);
}

#[tokio::test]
async fn test_failing_suggester_falls_back() {
    let mut game = SoloMatch::new(Box::new(Broken), 3, TIMEOUT);
    let round = game.play(Move::Rock).await.expect("Game should be open");
    assert!(round.fell_back);
    assert_eq!(game.opponent_name(), "Broken");
}

#[tokio::test]
async fn test_slow_suggester_times_out() {
    let mut game = SoloMatch::new(Box::new(Sleepy), 3, Duration::from_millis(50));
    let round = tokio::time::timeout(Duration::from_secs(5), game.play(Move::Paper))
        .await
        .expect("Timeout should have kicked in")
        .expect("Game should be open");
    assert!(round.fell_back);
}

#[tokio::test]
async fn test_random_suggester_never_fails() {
    let random = RandomSuggester::default();
    assert_eq!(random.name(), "Random");
    for _ in 0..20 {
        let suggestion = random.suggest(&[]).await.expect("Random never fails");
        assert!(Move::all().contains(suggestion.mv()));
    }
}

#[test]
fn test_parse_plain_reply() {
    let suggestion =
        LlmSuggester::parse_reply(r#"{"aiMove": "Paper", "reasoning": "Rock twice."}"#)
            .expect("Parse failed");
    assert_eq!(*suggestion.mv(), Move::Paper);
    assert_eq!(suggestion.rationale(), "Rock twice.");
}

#[test]
fn test_parse_reply_with_surrounding_prose() {
    let reply = concat!(
        "Sure! Here you go:\n",
        "```json\n{\"aiMove\": \"scissors\", \"reasoning\": \"x\"}\n```\n",
        "Good luck."
    );
    let suggestion = LlmSuggester::parse_reply(reply).expect("Parse failed");
    assert_eq!(*suggestion.mv(), Move::Scissors);
}

#[test]
fn test_parse_reply_without_reasoning() {
    let suggestion = LlmSuggester::parse_reply(r#"{"aiMove": "Rock"}"#).expect("Parse failed");
    assert_eq!(*suggestion.mv(), Move::Rock);
    assert!(suggestion.rationale().is_empty());
}

#[test]
fn test_parse_reply_rejects_garbage() {
    assert!(LlmSuggester::parse_reply("I choose rock").is_err());
    assert!(LlmSuggester::parse_reply(r#"{"aiMove": "Lizard"}"#).is_err());
    assert!(LlmSuggester::parse_reply(r#"{"move": "Rock"}"#).is_err());
    assert!(LlmSuggester::parse_reply("} backwards {").is_err());
}

#[test]
fn test_history_description() {
    assert!(LlmSuggester::describe_history(&[]).contains("not played yet"));
    let described = LlmSuggester::describe_history(&[Move::Rock, Move::Paper]);
    assert!(described.contains("[Rock, Paper]"));
}
