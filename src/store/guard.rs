//! Conditional-update primitives shared by every store.
//!
//! A [`Guard`] is evaluated against the record as it exists at write time,
//! inside whatever atomic section the store offers. If any condition fails
//! the [`RoomPatch`] is not applied and the caller gets the current record
//! back in [`UpdateOutcome::Rejected`].

use derive_setters::Setters;
use tracing::instrument;

use crate::games::rps::Move;
use crate::room::{PlayerId, Room, RoomStatus, Seat};

/// A single precondition on the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `(game, round)` unchanged since the caller's read.
    Fence {
        /// Expected game counter.
        game: u32,
        /// Expected round.
        round: u32,
    },
    /// Status equals the given value.
    Status(RoomStatus),
    /// Second seat is empty.
    Player2Vacant,
    /// Second seat is held by the given identity.
    Player2Is(PlayerId),
    /// The seat has not thrown a move this round.
    MoveUnset(Seat),
    /// The seat's presence flag is down.
    SeatOffline(Seat),
}

impl Condition {
    /// Evaluates the condition against `room`.
    pub fn holds(&self, room: &Room) -> bool {
        match self {
            Condition::Fence { game, round } => room.fence() == (*game, *round),
            Condition::Status(status) => room.status == *status,
            Condition::Player2Vacant => room.player2_id.is_none(),
            Condition::Player2Is(id) => room.player2_id.as_ref() == Some(id),
            Condition::MoveUnset(seat) => room.move_of(*seat).is_none(),
            Condition::SeatOffline(seat) => !room.is_online(*seat),
        }
    }
}

/// Conjunction of conditions; empty means unconditional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
    conditions: Vec<Condition>,
}

impl Guard {
    /// An unconditional guard.
    pub fn none() -> Self {
        Self::default()
    }

    /// A guard on the fence of `room` as the caller last read it.
    pub fn fenced(room: &Room) -> Self {
        let (game, round) = room.fence();
        Self::none().with(Condition::Fence { game, round })
    }

    /// Adds a condition.
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// The conditions, in insertion order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether every condition holds for `room`.
    #[instrument(level = "trace", skip(self, room), fields(room_id = %room.id))]
    pub fn holds(&self, room: &Room) -> bool {
        self.conditions.iter().all(|c| c.holds(room))
    }
}

/// Field-level changes to a room. Unset fields are left alone.
///
/// Nullable fields are doubly optional: `player1_move(None)` clears the
/// move, while never calling the setter leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(strip_option)]
pub struct RoomPatch {
    player2_id: Option<Option<PlayerId>>,
    player1_move: Option<Option<Move>>,
    player2_move: Option<Option<Move>>,
    player1_score: Option<u32>,
    player2_score: Option<u32>,
    status: Option<RoomStatus>,
    round: Option<u32>,
    game: Option<u32>,
    player1_online: Option<bool>,
    player2_online: Option<bool>,
}

impl RoomPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the move of `seat`.
    pub fn seat_move(self, seat: Seat, mv: Option<Move>) -> Self {
        match seat {
            Seat::Player1 => self.player1_move(mv),
            Seat::Player2 => self.player2_move(mv),
        }
    }

    /// Sets the presence flag of `seat`.
    pub fn seat_online(self, seat: Seat, online: bool) -> Self {
        match seat {
            Seat::Player1 => self.player1_online(online),
            Seat::Player2 => self.player2_online(online),
        }
    }

    /// Clears both moves and scores and starts game `game` at round 1.
    pub fn new_game(self, game: u32) -> Self {
        self.player1_move(None)
            .player2_move(None)
            .player1_score(0)
            .player2_score(0)
            .round(1)
            .game(game)
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Writes the patched fields into `room`.
    #[instrument(level = "trace", skip(self, room), fields(room_id = %room.id))]
    pub fn apply(&self, room: &mut Room) {
        if let Some(id) = &self.player2_id {
            room.player2_id = id.clone();
        }
        if let Some(mv) = self.player1_move {
            room.player1_move = mv;
        }
        if let Some(mv) = self.player2_move {
            room.player2_move = mv;
        }
        if let Some(score) = self.player1_score {
            room.player1_score = score;
        }
        if let Some(score) = self.player2_score {
            room.player2_score = score;
        }
        if let Some(status) = self.status {
            room.status = status;
        }
        if let Some(round) = self.round {
            room.round = round;
        }
        if let Some(game) = self.game {
            room.game = game;
        }
        if let Some(online) = self.player1_online {
            room.player1_online = online;
        }
        if let Some(online) = self.player2_online {
            room.player2_online = online;
        }
    }
}

/// Result of a guarded update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The guard held; carries the record after the write.
    Applied(Room),
    /// The guard failed; carries the record as found.
    Rejected(Room),
}

impl UpdateOutcome {
    /// The record carried by either variant.
    pub fn room(&self) -> &Room {
        match self {
            UpdateOutcome::Applied(room) | UpdateOutcome::Rejected(room) => room,
        }
    }

    /// Whether the write went through.
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }
}
