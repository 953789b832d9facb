//! The shared room record and its identifiers.

use chrono::{DateTime, Utc};
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::games::rps::Move;

/// Characters used when generating room codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated room codes.
pub const CODE_LEN: usize = 6;

/// Longest code accepted from user input.
const MAX_CODE_LEN: usize = 16;

/// Short, human-shareable room code. Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub struct RoomId(String);

impl RoomId {
    /// Generates a fresh random code.
    #[instrument]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        debug!(code = %code, "Generated room code");
        Self(code)
    }

    /// Parses a code typed by a user. Whitespace is trimmed and case ignored.
    ///
    /// Returns `None` for empty, overlong or non-alphanumeric input.
    #[instrument]
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim();
        if code.is_empty()
            || code.len() > MAX_CODE_LEN
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }
        Some(Self(code.to_ascii_uppercase()))
    }

    /// The code as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Self-asserted client identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates a random identity for this client.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identity as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which side of the table a participant occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// The room creator (host).
    Player1,
    /// The participant who joined.
    Player2,
}

impl Seat {
    /// The other seat.
    pub fn opposite(self) -> Self {
        match self {
            Seat::Player1 => Seat::Player2,
            Seat::Player2 => Seat::Player1,
        }
    }
}

/// Stored status of a room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString,
)]
pub enum RoomStatus {
    /// Host is alone in the room.
    WaitingForOpponent,
    /// Both seats filled, moves being collected.
    Playing,
    /// A round was resolved and is on display.
    Result,
    /// A participant went away mid-match.
    OpponentLeft,
    /// Someone reached the target score.
    GameOver,
}

/// One shared record per match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room code.
    pub id: RoomId,
    /// Host identity.
    pub player1_id: PlayerId,
    /// Joined identity, if any.
    pub player2_id: Option<PlayerId>,
    /// Host's move this round.
    pub player1_move: Option<Move>,
    /// Joiner's move this round.
    pub player2_move: Option<Move>,
    /// Host's score.
    pub player1_score: u32,
    /// Joiner's score.
    pub player2_score: u32,
    /// Score that ends the game.
    pub target_score: u32,
    /// Stored status.
    pub status: RoomStatus,
    /// Round within the current game, starting at 1.
    pub round: u32,
    /// Game counter, bumped on every new-game reset.
    pub game: u32,
    /// Host presence.
    pub player1_online: bool,
    /// Joiner presence.
    pub player2_online: bool,
    /// Last write, assigned by the store.
    pub last_activity: DateTime<Utc>,
}

impl Room {
    /// Creates the initial record for a room hosted by `host`.
    #[instrument(skip(host), fields(host = %host))]
    pub fn new(id: RoomId, host: PlayerId, target_score: u32) -> Self {
        Self {
            id,
            player1_id: host,
            player2_id: None,
            player1_move: None,
            player2_move: None,
            player1_score: 0,
            player2_score: 0,
            target_score,
            status: RoomStatus::WaitingForOpponent,
            round: 1,
            game: 1,
            player1_online: true,
            player2_online: false,
            last_activity: Utc::now(),
        }
    }

    /// Seat held by `player`, if any.
    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        if &self.player1_id == player {
            Some(Seat::Player1)
        } else if self.player2_id.as_ref() == Some(player) {
            Some(Seat::Player2)
        } else {
            None
        }
    }

    /// Identity in `seat`.
    pub fn occupant(&self, seat: Seat) -> Option<&PlayerId> {
        match seat {
            Seat::Player1 => Some(&self.player1_id),
            Seat::Player2 => self.player2_id.as_ref(),
        }
    }

    /// Move thrown from `seat` this round.
    pub fn move_of(&self, seat: Seat) -> Option<Move> {
        match seat {
            Seat::Player1 => self.player1_move,
            Seat::Player2 => self.player2_move,
        }
    }

    /// Score of `seat`.
    pub fn score_of(&self, seat: Seat) -> u32 {
        match seat {
            Seat::Player1 => self.player1_score,
            Seat::Player2 => self.player2_score,
        }
    }

    /// Last-known presence of `seat`.
    pub fn is_online(&self, seat: Seat) -> bool {
        match seat {
            Seat::Player1 => self.player1_online,
            Seat::Player2 => self.player2_online,
        }
    }

    /// Both moves, once both are in.
    pub fn both_moves(&self) -> Option<(Move, Move)> {
        self.player1_move.zip(self.player2_move)
    }

    /// Whether a round is complete and waiting for a resolver.
    pub fn needs_resolution(&self) -> bool {
        self.status == RoomStatus::Playing && self.both_moves().is_some()
    }

    /// The concurrency fence: `(game, round)`.
    pub fn fence(&self) -> (u32, u32) {
        (self.game, self.round)
    }
}
