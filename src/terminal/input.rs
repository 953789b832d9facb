//! Line commands typed at the prompt.

use std::str::FromStr;

use anyhow::Result;
use rps_dueler::Move;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Throw a hand.
    Throw(Move),
    /// Next round or new game.
    Again,
    /// Free the seat of a departed opponent.
    Reopen,
    /// Leave the room.
    Leave,
    /// Exit the program.
    Quit,
    /// Show the commands.
    Help,
    /// Blank line.
    Empty,
    /// Anything else.
    Unknown(String),
}

impl Input {
    /// Parses a line. Moves accept full names or first letters.
    pub fn parse(line: &str) -> Self {
        let word = line.trim();
        if word.is_empty() {
            return Input::Empty;
        }
        if let Ok(mv) = Move::from_str(word) {
            return Input::Throw(mv);
        }
        match word.to_ascii_lowercase().as_str() {
            "again" | "a" | "y" | "yes" => Input::Again,
            "reopen" => Input::Reopen,
            "leave" => Input::Leave,
            "quit" | "q" | "exit" | "n" | "no" => Input::Quit,
            "help" | "h" | "?" => Input::Help,
            _ => Input::Unknown(word.to_string()),
        }
    }
}

pub const HELP: &str = "Commands: rock|paper|scissors (r/p/s), again, reopen, leave, quit";

/// Async line reader over stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next parsed line, `None` at end of input.
    pub async fn next(&mut self) -> Result<Option<Input>> {
        Ok(self.lines.next_line().await?.map(|line| Input::parse(&line)))
    }

    /// Asks until a move is given. `None` means the player wants out.
    pub async fn ask_move(&mut self, who: &str) -> Result<Option<Move>> {
        loop {
            println!("{who}, throw rock, paper or scissors:");
            match self.next().await? {
                Some(Input::Throw(mv)) => return Ok(Some(mv)),
                Some(Input::Quit | Input::Leave) | None => return Ok(None),
                Some(Input::Help) => println!("{HELP}"),
                Some(_) => println!("That's not a move."),
            }
        }
    }

    /// Yes/no question; end of input counts as no.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            println!("{question} [y/n]");
            match self.next().await? {
                Some(Input::Again) => return Ok(true),
                Some(Input::Quit | Input::Leave) | None => return Ok(false),
                Some(_) => {}
            }
        }
    }
}
