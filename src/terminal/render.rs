//! Text rendering of room views.

use rps_dueler::{Outcome, Phase, RoomView};

fn scoreline(view: &RoomView) -> String {
    format!(
        "Game {} round {} | You {} - {} Opponent (first to {})",
        view.game, view.round, view.my_score, view.opponent_score, view.target_score
    )
}

fn reveal(view: &RoomView) -> Option<String> {
    let (mine, theirs, outcome) = (view.my_move?, view.opponent_move?, view.outcome?);
    Some(format!(
        "You threw {mine}, your opponent threw {theirs}. {}",
        outcome.headline()
    ))
}

/// Lines describing `view` to its viewer.
pub fn describe(view: &RoomView) -> Vec<String> {
    let mut lines = Vec::new();
    let code = view
        .room_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    match view.phase {
        Phase::Lobby => lines.push("You are not in a room.".to_string()),
        Phase::WaitingForOpponent => {
            lines.push(format!("Room {code}: waiting for an opponent."));
            lines.push(format!("Share the code {code} so they can join."));
        }
        Phase::Playing => {
            lines.push(scoreline(view));
            match view.my_move {
                Some(mv) if view.awaiting_resolution => {
                    lines.push(format!("You threw {mv}. Waiting for the result..."))
                }
                Some(mv) => lines.push(format!("You threw {mv}. Waiting for your opponent...")),
                None if view.opponent_has_moved => {
                    lines.push("Your opponent has thrown. Your move (r/p/s).".to_string())
                }
                None => lines.push("Your move (r/p/s).".to_string()),
            }
        }
        Phase::Result => {
            lines.extend(reveal(view));
            lines.push(scoreline(view));
            if view.is_host {
                lines.push("Type 'again' for the next round.".to_string());
            } else {
                lines.push("Waiting for the host to start the next round.".to_string());
            }
        }
        Phase::GameOver => {
            lines.extend(reveal(view));
            lines.push(scoreline(view));
            lines.push(match view.match_won {
                Some(true) => "You won the match!".to_string(),
                _ => "Your opponent won the match.".to_string(),
            });
            if view.is_host {
                lines.push("Type 'again' for a new game.".to_string());
            } else {
                lines.push("Waiting for the host to start a new game.".to_string());
            }
        }
        Phase::OpponentLeft => {
            lines.push("Your opponent left the game.".to_string());
            if view.is_host {
                lines.push("Type 'reopen' to wait for a new opponent, or 'leave'.".to_string());
            } else {
                lines.push("Type 'leave' to go back to the lobby.".to_string());
            }
        }
    }
    lines
}

pub fn render(view: &RoomView) {
    for line in describe(view) {
        println!("{line}");
    }
}

/// One-line summary of a round for hot-seat and solo play.
pub fn round_summary(first: &str, second: &str, outcome: Outcome) -> String {
    match outcome {
        Outcome::Win => format!("{first} wins the round."),
        Outcome::Lose => format!("{second} wins the round."),
        Outcome::Draw => "It's a draw.".to_string(),
    }
}
