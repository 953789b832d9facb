//! Hot-seat play: two sessions sharing one in-memory store.

use std::sync::Arc;

use anyhow::Result;
use rps_dueler::{GameConfig, MemoryStore, Phase, PlayerId, RoomSession, RoomStore};
use tracing::{info, instrument};

use super::input::Prompt;
use super::render::round_summary;

const CLEAR: &str = "\x1B[2J\x1B[H";

#[instrument(skip(config))]
pub async fn run_local(config: &GameConfig) -> Result<()> {
    let store: Arc<dyn RoomStore> = Arc::new(MemoryStore::new());
    let target = *config.target_score();
    let mut one = RoomSession::new(store.clone(), PlayerId::generate(), target);
    let mut two = RoomSession::new(store, PlayerId::generate(), target);

    let code = one.create_room().await?;
    two.join_room(code.as_str()).await?;
    info!(room_id = %code, "Hot-seat room ready");
    println!("Hot-seat match, first to {target}. Player 2, look away while Player 1 picks.");

    let mut prompt = Prompt::stdin();
    loop {
        let Some(first) = prompt.ask_move("Player 1").await? else {
            break;
        };
        one.submit_move(first).await?;
        print!("{CLEAR}");

        let Some(second) = prompt.ask_move("Player 2").await? else {
            break;
        };
        // Completes the round, so this call resolves it too.
        two.submit_move(second).await?;

        let view = one.view();
        if let Some(outcome) = view.outcome {
            println!("Player 1 threw {first}, Player 2 threw {second}.");
            println!("{}", round_summary("Player 1", "Player 2", outcome));
        }
        println!(
            "Score: Player 1 {} - {} Player 2",
            view.my_score, view.opponent_score
        );

        if view.phase == Phase::GameOver {
            let winner = if view.match_won == Some(true) {
                "Player 1"
            } else {
                "Player 2"
            };
            println!("{winner} wins the match!");
            if !prompt.confirm("Play again?").await? {
                break;
            }
        }
        one.play_again().await?;
    }

    two.leave_room().await?;
    one.leave_room().await?;
    Ok(())
}
