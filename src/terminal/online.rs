//! Hosting or joining a room over the configured store.

use anyhow::Result;
use rps_dueler::{Ack, GameConfig, Observation, Phase, RoomError, RoomSession};
use tracing::{debug, info, instrument, warn};

use super::input::{HELP, Input, Prompt};
use super::render::render;

enum Flow {
    Continue,
    Exit,
}

/// Creates a room (no `code`) or joins one, then plays until the player
/// leaves, quits, or the room closes.
#[instrument(skip(config), fields(backend = ?config.backend()))]
pub async fn run_online(config: &GameConfig, code: Option<String>) -> Result<()> {
    let store = config.open_store()?;
    let player = config.player_identity();
    println!("Playing as {} (id {player})", config.player_name());
    let mut session = RoomSession::new(store, player, *config.target_score());

    let entered = match code {
        None => session.create_room().await.map(|id| {
            println!("Created room {id}.");
        }),
        Some(code) => session.join_room(&code).await.map(|seat| {
            info!(?seat, "Entered room");
        }),
    };
    if let Err(e) = entered {
        println!("Could not enter the room: {e}");
        return Ok(());
    }
    println!("{HELP}");

    let mut prompt = Prompt::stdin();
    let mut shown = session.view();
    render(&shown);
    if shown.round_complete {
        settle(&mut session).await;
    }

    loop {
        tokio::select! {
            input = prompt.next() => {
                let Some(input) = input? else { break };
                match handle(&mut session, input).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => break,
                    Err(e) if e.is_expected() => println!("{e}. Try again."),
                    Err(e @ RoomError::RoomNotFound(_)) => {
                        println!("{e}.");
                        return Ok(());
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            observed = session.next_view() => {
                match observed {
                    Ok(Observation::Changed(view)) => {
                        if view.round_complete {
                            settle(&mut session).await;
                        }
                        if view != shown {
                            render(&view);
                            shown = view;
                        }
                        if shown.phase == Phase::Lobby {
                            println!("You no longer have a seat in this room.");
                            return Ok(());
                        }
                    }
                    Ok(Observation::Closed(notice)) => {
                        println!("{notice}.");
                        return Ok(());
                    }
                    Err(e) => {
                        debug!(error = %e, "Subscription ended");
                        return Ok(());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Interrupted");
                break;
            }
        }
    }

    session.detach().await;
    Ok(())
}

async fn handle(session: &mut RoomSession, input: Input) -> Result<Flow, RoomError> {
    match input {
        Input::Throw(mv) => acknowledge(session.submit_move(mv).await?),
        Input::Again => acknowledge(session.play_again().await?),
        Input::Reopen => acknowledge(session.reopen_room().await?),
        Input::Leave => {
            session.leave_room().await?;
            println!("You left the room.");
            return Ok(Flow::Exit);
        }
        Input::Quit => return Ok(Flow::Exit),
        Input::Help => println!("{HELP}"),
        Input::Empty => render(&session.view()),
        Input::Unknown(word) => println!("Unknown command '{word}'. {HELP}"),
    }
    Ok(Flow::Continue)
}

fn acknowledge(ack: Ack) {
    if let Ack::Skipped(notice) = ack {
        println!("{notice}.");
    }
}

/// Both moves are in: whoever sees it first resolves.
async fn settle(session: &mut RoomSession) {
    match session.resolve_round_if_ready().await {
        Ok(resolution) => debug!(?resolution, "Resolution attempted"),
        Err(e) => warn!(error = %e, "Could not resolve round"),
    }
}
