//! Single-player match against the computer.

use anyhow::Result;
use rps_dueler::{
    GameConfig, LlmClient, LlmSuggester, MoveSuggester, RandomSuggester, SoloMatch,
};
use tracing::{instrument, warn};

use super::input::Prompt;
use super::render::round_summary;

fn pick_opponent(config: &GameConfig, random: bool) -> Box<dyn MoveSuggester> {
    if random {
        return Box::new(RandomSuggester::default());
    }
    match config.create_llm_config() {
        Ok(llm) => Box::new(LlmSuggester::new("Strategist".to_string(), LlmClient::new(llm))),
        Err(e) => {
            warn!(error = %e, "No LLM available, using the random opponent");
            println!("No API key found, so you'll face the random opponent.");
            Box::new(RandomSuggester::default())
        }
    }
}

#[instrument(skip(config))]
pub async fn run_solo(config: &GameConfig, random: bool) -> Result<()> {
    let mut game = SoloMatch::new(
        pick_opponent(config, random),
        *config.target_score(),
        config.suggestion_timeout(),
    );
    println!(
        "You vs {}, first to {}.",
        game.opponent_name(),
        game.target_score()
    );

    let mut prompt = Prompt::stdin();
    loop {
        let Some(mv) = prompt.ask_move(&format!("Round {}", game.round())).await? else {
            break;
        };
        let Some(round) = game.play(mv).await else {
            continue;
        };

        println!("You threw {}, {} threw {}.", round.human, game.opponent_name(), round.opponent);
        println!("{}", round_summary("You", game.opponent_name(), round.outcome));
        if !round.fell_back {
            println!("\"{}\"", round.rationale);
        }
        let (you, them) = game.score();
        println!("Score: You {you} - {them} {}", game.opponent_name());

        if let Some(won) = game.human_won() {
            println!("{}", if won { "You won the match!" } else { "You lost the match." });
            if !prompt.confirm("Play again?").await? {
                break;
            }
            game.new_game();
        }
    }
    Ok(())
}
