//! What one client sees of a room.
//!
//! The phase is a pure function of the stored record and the viewer's
//! identity. Nothing here is kept between observations, so a client can
//! never drift away from the store.

use serde::Serialize;
use tracing::instrument;

use crate::games::rps::{Move, Outcome, resolve_pair};
use crate::room::{PlayerId, Room, RoomId, RoomStatus, Seat};

/// Local phase of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Not in a room.
    Lobby,
    /// Host alone, room code on display.
    WaitingForOpponent,
    /// Round open for moves.
    Playing,
    /// Round resolved, waiting for the host to continue.
    Result,
    /// The other side disconnected mid-match.
    OpponentLeft,
    /// Target score reached.
    GameOver,
}

/// A room projected onto one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    /// Derived phase.
    pub phase: Phase,
    /// Room code, outside the lobby.
    pub room_id: Option<RoomId>,
    /// Viewer's seat.
    pub seat: Option<Seat>,
    /// Whether the viewer created the room.
    pub is_host: bool,
    /// Viewer's move this round.
    pub my_move: Option<Move>,
    /// Opponent's move, revealed once the round is resolved.
    pub opponent_move: Option<Move>,
    /// Whether the opponent has thrown, revealed or not.
    pub opponent_has_moved: bool,
    /// Viewer's score.
    pub my_score: u32,
    /// Opponent's score.
    pub opponent_score: u32,
    /// Score that ends the game.
    pub target_score: u32,
    /// Current round.
    pub round: u32,
    /// Current game.
    pub game: u32,
    /// Viewer's outcome for the revealed round.
    pub outcome: Option<Outcome>,
    /// Whether the viewer won the match, once it is over.
    pub match_won: Option<bool>,
    /// Viewer has thrown and the result is not in yet.
    pub awaiting_resolution: bool,
    /// Both moves are in but nobody has resolved the round yet.
    pub round_complete: bool,
    /// Last-known presence of the opponent.
    pub opponent_online: bool,
}

impl RoomView {
    /// The view of a client outside any room.
    pub fn lobby() -> Self {
        Self {
            phase: Phase::Lobby,
            room_id: None,
            seat: None,
            is_host: false,
            my_move: None,
            opponent_move: None,
            opponent_has_moved: false,
            my_score: 0,
            opponent_score: 0,
            target_score: 0,
            round: 0,
            game: 0,
            outcome: None,
            match_won: None,
            awaiting_resolution: false,
            round_complete: false,
            opponent_online: false,
        }
    }

    /// Projects `room` onto `viewer`.
    ///
    /// A missing room, or one the viewer holds no seat in, is the lobby.
    #[instrument(level = "trace", skip(room, viewer))]
    pub fn derive(room: Option<&Room>, viewer: &PlayerId) -> Self {
        let Some(room) = room else {
            return Self::lobby();
        };
        let Some(seat) = room.seat_of(viewer) else {
            return Self::lobby();
        };

        let other = seat.opposite();
        let opponent_present = room.occupant(other).is_some();
        let opponent_online = opponent_present && room.is_online(other);

        let phase = match room.status {
            RoomStatus::WaitingForOpponent => Phase::WaitingForOpponent,
            RoomStatus::OpponentLeft => Phase::OpponentLeft,
            RoomStatus::GameOver => Phase::GameOver,
            RoomStatus::Playing | RoomStatus::Result if opponent_present && !opponent_online => {
                Phase::OpponentLeft
            }
            RoomStatus::Playing => Phase::Playing,
            RoomStatus::Result => Phase::Result,
        };

        let revealed = matches!(room.status, RoomStatus::Result | RoomStatus::GameOver);
        let my_move = room.move_of(seat);
        let their_move = room.move_of(other);
        let outcome = room
            .both_moves()
            .filter(|_| revealed)
            .map(|(first, second)| {
                let (player1, player2) = resolve_pair(first, second);
                match seat {
                    Seat::Player1 => player1,
                    Seat::Player2 => player2,
                }
            });

        let my_score = room.score_of(seat);
        let match_won =
            (room.status == RoomStatus::GameOver).then(|| my_score >= room.target_score);

        Self {
            phase,
            room_id: Some(room.id.clone()),
            seat: Some(seat),
            is_host: seat == Seat::Player1,
            my_move,
            opponent_move: if revealed { their_move } else { None },
            opponent_has_moved: their_move.is_some(),
            my_score,
            opponent_score: room.score_of(other),
            target_score: room.target_score,
            round: room.round,
            game: room.game,
            outcome,
            match_won,
            awaiting_resolution: room.status == RoomStatus::Playing && my_move.is_some(),
            round_complete: room.needs_resolution(),
            opponent_online,
        }
    }

    /// Whether the viewer may throw a move now.
    pub fn can_move(&self) -> bool {
        self.phase == Phase::Playing && self.my_move.is_none()
    }
}
