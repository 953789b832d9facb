//! Room session errors and user-facing notices.

use derive_more::Display;

use crate::room::RoomId;
use crate::store::StoreError;

/// Failure of a room operation.
#[derive(Debug, Clone, Display)]
pub enum RoomError {
    /// The typed code is not a valid room code.
    #[display("'{}' is not a valid room code", _0)]
    InvalidRoomCode(String),

    /// No room exists under this code.
    #[display("Room {} not found", _0)]
    RoomNotFound(RoomId),

    /// Both seats are taken by other players.
    #[display("Room {} is full", _0)]
    RoomFull(RoomId),

    /// The operation needs an active room.
    #[display("Not in a room")]
    NotInRoom,

    /// A guarded write lost a race. Expected under concurrency.
    #[display("Room changed before the write landed")]
    StaleWriteRejected,

    /// The store refused or failed the request.
    #[display("Store request failed: {}", _0)]
    StoreWriteError(StoreError),
}

impl RoomError {
    /// Whether this is an expected concurrency outcome rather than a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, RoomError::StaleWriteRejected)
    }
}

impl std::error::Error for RoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoomError::StoreWriteError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for RoomError {
    fn from(err: StoreError) -> Self {
        RoomError::StoreWriteError(err)
    }
}

/// A request that was understood but intentionally not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Notice {
    /// The caller already threw this round.
    #[display("You already picked a move this round")]
    MoveAlreadySubmitted,

    /// Moves are only accepted while a round is open.
    #[display("The round is not open for moves")]
    NotPlaying,

    /// Only the host starts the next round or game.
    #[display("Waiting for the host")]
    WaitingForHost,

    /// A round is already under way.
    #[display("A round is already in progress")]
    RoundInProgress,

    /// Nobody is sitting in the second seat.
    #[display("No opponent in the room")]
    NoOpponent,

    /// The opponent is still connected.
    #[display("Your opponent is still here")]
    OpponentStillPresent,

    /// The host closed the room.
    #[display("The room was closed")]
    RoomClosed,
}

/// Result of a write-capable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// The store accepted the write.
    Written,
    /// Nothing was written; show the notice.
    Skipped(Notice),
}
