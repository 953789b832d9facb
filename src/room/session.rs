//! Room session state machine.
//!
//! A [`RoomSession`] is one client's handle on one room at a time. Every
//! mutation goes through [`RoomStore::update`] with a [`Guard`] describing
//! what the client believed when it decided to write; losing a race shows
//! up as a rejected update, never as a second write.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::games::rps::{Move, Outcome, resolve_pair};
use crate::room::{
    Ack, Notice, Phase, PlayerId, Room, RoomError, RoomId, RoomStatus, RoomView, Seat,
};
use crate::store::{
    Condition, Guard, RoomPatch, RoomStore, RoomWatch, StoreError, StoreErrorKind, UpdateOutcome,
};

/// How many fresh codes to try before giving up on room creation.
const MAX_CREATE_ATTEMPTS: usize = 5;

/// Result of an attempt to resolve the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// This client's write resolved the round.
    Resolved {
        /// Outcome from this client's seat.
        outcome: Outcome,
        /// Status the room moved to.
        status: RoomStatus,
    },
    /// The round is not complete, or not open.
    NotReady,
    /// Another writer got there first.
    AlreadyResolved,
}

/// What the next store change meant for this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The room changed; here is the new view.
    Changed(RoomView),
    /// The room is gone and the session is back in the lobby.
    Closed(Notice),
}

#[derive(Debug)]
struct ActiveRoom {
    id: RoomId,
    seat: Seat,
    watch: RoomWatch,
    last_good: Room,
}

impl ActiveRoom {
    /// Keeps whichever record is newer: the subscription may lag behind
    /// the result of our own writes.
    fn remember(&mut self, room: &Room) {
        if room.id == self.id && room.last_activity >= self.last_good.last_activity {
            self.last_good = room.clone();
        }
    }

    fn freshest(&self) -> Option<Room> {
        match self.watch.current() {
            Some(seen) if seen.last_activity > self.last_good.last_activity => Some(seen),
            Some(_) => Some(self.last_good.clone()),
            None => None,
        }
    }
}

/// One client's view of, and authority over, a shared room.
#[derive(Debug)]
pub struct RoomSession {
    store: Arc<dyn RoomStore>,
    player: PlayerId,
    target_score: u32,
    active: Option<ActiveRoom>,
}

impl RoomSession {
    /// Creates a session in the lobby.
    ///
    /// `target_score` is used when this client creates a room; joined rooms
    /// carry the host's choice.
    #[instrument(skip(store), fields(player = %player))]
    pub fn new(store: Arc<dyn RoomStore>, player: PlayerId, target_score: u32) -> Self {
        info!(target_score, "Creating room session");
        Self {
            store,
            player,
            target_score: target_score.max(1),
            active: None,
        }
    }

    /// This client's identity.
    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Code of the active room.
    pub fn room_id(&self) -> Option<&RoomId> {
        self.active.as_ref().map(|a| &a.id)
    }

    /// Seat in the active room.
    pub fn seat(&self) -> Option<Seat> {
        self.active.as_ref().map(|a| a.seat)
    }

    /// The newest record this session has seen, if in a room.
    pub fn last_known_room(&self) -> Option<Room> {
        self.active.as_ref().and_then(ActiveRoom::freshest)
    }

    /// Current view derived from the newest known record.
    pub fn view(&self) -> RoomView {
        RoomView::derive(self.last_known_room().as_ref(), &self.player)
    }

    /// Creates a room hosted by this client and enters it.
    ///
    /// # Errors
    ///
    /// [`RoomError::StoreWriteError`] if the store rejects the insert for
    /// any reason other than a code collision, or if every attempt collided.
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn create_room(&mut self) -> Result<RoomId, RoomError> {
        self.detach().await;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let room = Room::new(RoomId::generate(), self.player.clone(), self.target_score);
            let id = room.id.clone();
            match self.store.insert(room).await {
                Ok(room) => {
                    info!(room_id = %id, attempt, "Room created");
                    self.attach(room, Seat::Player1).await?;
                    return Ok(id);
                }
                Err(e) if e.kind == StoreErrorKind::Conflict => {
                    warn!(room_id = %id, attempt, "Room code collision, retrying");
                }
                Err(e) => return Err(RoomError::StoreWriteError(e)),
            }
        }

        Err(RoomError::StoreWriteError(StoreError::conflict(format!(
            "No free room code after {} attempts",
            MAX_CREATE_ATTEMPTS
        ))))
    }

    /// Joins the room with the typed `code`, or reconnects to it.
    ///
    /// # Errors
    ///
    /// [`RoomError::InvalidRoomCode`], [`RoomError::RoomNotFound`],
    /// [`RoomError::RoomFull`] (including a lost race for the seat), or
    /// [`RoomError::StoreWriteError`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn join_room(&mut self, code: &str) -> Result<Seat, RoomError> {
        let id = RoomId::parse(code)
            .ok_or_else(|| RoomError::InvalidRoomCode(code.trim().to_string()))?;

        if self.room_id() != Some(&id) {
            self.detach().await;
        }

        let room = self
            .store
            .get(&id)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound(id.clone()))?;

        if let Some(seat) = room.seat_of(&self.player) {
            info!(room_id = %id, ?seat, "Reconnecting to room");
            self.attach(room, seat).await?;
            self.mark_online().await?;
            return Ok(seat);
        }

        if room.player2_id.is_some() {
            warn!(room_id = %id, "Second seat already taken");
            return Err(RoomError::RoomFull(id));
        }

        // A new pairing starts a fresh game.
        let guard = Guard::none().with(Condition::Player2Vacant);
        let patch = RoomPatch::new()
            .player2_id(Some(self.player.clone()))
            .player2_online(true)
            .status(RoomStatus::Playing)
            .new_game(room.game + 1);

        match self.store.update(&id, guard, patch).await {
            Ok(UpdateOutcome::Applied(room)) => {
                info!(room_id = %id, "Claimed second seat");
                self.attach(room, Seat::Player2).await?;
                Ok(Seat::Player2)
            }
            Ok(UpdateOutcome::Rejected(current)) => {
                if current.player2_id.as_ref() == Some(&self.player) {
                    debug!(room_id = %id, "Seat already ours");
                    self.attach(current, Seat::Player2).await?;
                    Ok(Seat::Player2)
                } else {
                    info!(room_id = %id, "Lost the race for the second seat");
                    Err(RoomError::RoomFull(id))
                }
            }
            Err(e) if e.kind == StoreErrorKind::NotFound => Err(RoomError::RoomNotFound(id)),
            Err(e) => Err(RoomError::StoreWriteError(e)),
        }
    }

    /// Throws `mv` for the current round.
    ///
    /// If this write completes the round, resolution is attempted straight
    /// away.
    ///
    /// # Errors
    ///
    /// [`RoomError::NotInRoom`], [`RoomError::RoomNotFound`],
    /// [`RoomError::StaleWriteRejected`] if the round moved on between read
    /// and write, or [`RoomError::StoreWriteError`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn submit_move(&mut self, mv: Move) -> Result<Ack, RoomError> {
        let seat = self.active_seat()?;
        let room = self.fetch().await?;

        if room.status != RoomStatus::Playing {
            debug!(status = %room.status, "Move outside an open round");
            return Ok(Ack::Skipped(Notice::NotPlaying));
        }
        if room.move_of(seat).is_some() {
            debug!("Move already submitted");
            return Ok(Ack::Skipped(Notice::MoveAlreadySubmitted));
        }

        let guard = Guard::fenced(&room)
            .with(Condition::Status(RoomStatus::Playing))
            .with(Condition::MoveUnset(seat));
        let patch = RoomPatch::new().seat_move(seat, Some(mv));

        match self.guarded_update(&room.id, guard, patch).await? {
            UpdateOutcome::Applied(room) => {
                info!(room_id = %room.id, round = room.round, %mv, "Move submitted");
                if room.needs_resolution() {
                    self.resolve_round_if_ready().await?;
                }
                Ok(Ack::Written)
            }
            UpdateOutcome::Rejected(current) => {
                if current.status != RoomStatus::Playing {
                    Ok(Ack::Skipped(Notice::NotPlaying))
                } else if current.move_of(seat).is_some() {
                    Ok(Ack::Skipped(Notice::MoveAlreadySubmitted))
                } else {
                    warn!(room_id = %current.id, "Round moved on before the move landed");
                    Err(RoomError::StaleWriteRejected)
                }
            }
        }
    }

    /// Resolves the round if both moves are in and it is still open.
    ///
    /// Safe to call from any client, any number of times: the write is
    /// guarded on the fence, so at most one caller per round succeeds.
    ///
    /// # Errors
    ///
    /// [`RoomError::NotInRoom`], [`RoomError::RoomNotFound`], or
    /// [`RoomError::StoreWriteError`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn resolve_round_if_ready(&mut self) -> Result<Resolution, RoomError> {
        let seat = self.active_seat()?;
        let room = self.fetch().await?;

        let Some((first, second)) = room.both_moves() else {
            return Ok(Resolution::NotReady);
        };
        if room.status != RoomStatus::Playing {
            return Ok(Resolution::NotReady);
        }

        let (player1, player2) = resolve_pair(first, second);
        let (score1, score2) = match player1 {
            Outcome::Win => (room.player1_score + 1, room.player2_score),
            Outcome::Lose => (room.player1_score, room.player2_score + 1),
            Outcome::Draw => (room.player1_score, room.player2_score),
        };
        let status = if score1.max(score2) >= room.target_score {
            RoomStatus::GameOver
        } else {
            RoomStatus::Result
        };

        let guard = Guard::fenced(&room).with(Condition::Status(RoomStatus::Playing));
        let patch = RoomPatch::new()
            .player1_score(score1)
            .player2_score(score2)
            .status(status);

        match self.guarded_update(&room.id, guard, patch).await? {
            UpdateOutcome::Applied(room) => {
                info!(
                    room_id = %room.id,
                    round = room.round,
                    player1_outcome = %player1,
                    score = %format!("{}-{}", score1, score2),
                    %status,
                    "Round resolved"
                );
                let outcome = match seat {
                    Seat::Player1 => player1,
                    Seat::Player2 => player2,
                };
                Ok(Resolution::Resolved { outcome, status })
            }
            UpdateOutcome::Rejected(current) => {
                debug!(room_id = %current.id, "Round already resolved elsewhere");
                Ok(Resolution::AlreadyResolved)
            }
        }
    }

    /// Host only: next round after a result, or a new game after game over.
    ///
    /// # Errors
    ///
    /// [`RoomError::NotInRoom`], [`RoomError::RoomNotFound`], or
    /// [`RoomError::StoreWriteError`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn play_again(&mut self) -> Result<Ack, RoomError> {
        if self.active_seat()? != Seat::Player1 {
            return Ok(Ack::Skipped(Notice::WaitingForHost));
        }
        let room = self.fetch().await?;

        let (guard, patch) = match room.status {
            RoomStatus::GameOver => (
                Guard::fenced(&room).with(Condition::Status(RoomStatus::GameOver)),
                RoomPatch::new()
                    .new_game(room.game + 1)
                    .status(RoomStatus::Playing),
            ),
            RoomStatus::Result => (
                Guard::fenced(&room).with(Condition::Status(RoomStatus::Result)),
                RoomPatch::new()
                    .player1_move(None)
                    .player2_move(None)
                    .round(room.round + 1)
                    .status(RoomStatus::Playing),
            ),
            RoomStatus::Playing => return Ok(Ack::Skipped(Notice::RoundInProgress)),
            RoomStatus::WaitingForOpponent | RoomStatus::OpponentLeft => {
                return Ok(Ack::Skipped(Notice::NoOpponent));
            }
        };

        match self.guarded_update(&room.id, guard, patch).await? {
            UpdateOutcome::Applied(room) => {
                info!(
                    room_id = %room.id,
                    game = room.game,
                    round = room.round,
                    "Next round started"
                );
                Ok(Ack::Written)
            }
            UpdateOutcome::Rejected(current) => {
                debug!(room_id = %current.id, status = %current.status, "Restart already happened");
                Ok(Ack::Skipped(Notice::RoundInProgress))
            }
        }
    }

    /// Host only: frees the second seat of a departed opponent so someone
    /// else can join.
    ///
    /// # Errors
    ///
    /// [`RoomError::StaleWriteRejected`] if the room changed meanwhile,
    /// plus the errors of [`RoomSession::play_again`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn reopen_room(&mut self) -> Result<Ack, RoomError> {
        if self.active_seat()? != Seat::Player1 {
            return Ok(Ack::Skipped(Notice::WaitingForHost));
        }
        let room = self.fetch().await?;

        let Some(opponent) = room.player2_id.clone() else {
            return Ok(Ack::Skipped(Notice::NoOpponent));
        };
        if room.player2_online {
            return Ok(Ack::Skipped(Notice::OpponentStillPresent));
        }

        let guard = Guard::fenced(&room)
            .with(Condition::Player2Is(opponent))
            .with(Condition::SeatOffline(Seat::Player2));
        let patch = RoomPatch::new()
            .player2_id(None)
            .player2_online(false)
            .status(RoomStatus::WaitingForOpponent)
            .new_game(room.game + 1);

        match self.guarded_update(&room.id, guard, patch).await? {
            UpdateOutcome::Applied(room) => {
                info!(room_id = %room.id, "Room reopened for a new opponent");
                Ok(Ack::Written)
            }
            UpdateOutcome::Rejected(current) if current.player2_online => {
                Ok(Ack::Skipped(Notice::OpponentStillPresent))
            }
            UpdateOutcome::Rejected(_) => Err(RoomError::StaleWriteRejected),
        }
    }

    /// Leaves the active room.
    ///
    /// The host deletes the room; the joiner frees its seat and leaves the
    /// room waiting for someone else. The subscription is dropped either
    /// way, even when the store call fails.
    ///
    /// # Errors
    ///
    /// [`RoomError::StoreWriteError`] if the store call fails.
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn leave_room(&mut self) -> Result<(), RoomError> {
        let Some(active) = self.active.take() else {
            debug!("Not in a room, nothing to leave");
            return Ok(());
        };

        let result = match active.seat {
            Seat::Player1 => self.store.delete(&active.id).await,
            Seat::Player2 => {
                let guard = Guard::none().with(Condition::Player2Is(self.player.clone()));
                let patch = RoomPatch::new()
                    .player2_id(None)
                    .player2_move(None)
                    .player2_online(false)
                    .status(RoomStatus::WaitingForOpponent);
                match self.store.update(&active.id, guard, patch).await {
                    Ok(outcome) => {
                        if !outcome.is_applied() {
                            debug!("Seat was no longer ours");
                        }
                        Ok(())
                    }
                    Err(e) if e.kind == StoreErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e),
                }
            }
        };

        info!(room_id = %active.id, seat = ?active.seat, "Left room");
        drop(active);
        result.map_err(RoomError::StoreWriteError)
    }

    /// Marks this client present in the active room.
    ///
    /// # Errors
    ///
    /// [`RoomError::NotInRoom`], [`RoomError::RoomNotFound`], or
    /// [`RoomError::StoreWriteError`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn mark_online(&mut self) -> Result<(), RoomError> {
        self.set_presence(true).await
    }

    /// Marks this client absent from the active room.
    ///
    /// # Errors
    ///
    /// Same as [`RoomSession::mark_online`].
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn mark_offline(&mut self) -> Result<(), RoomError> {
        self.set_presence(false).await
    }

    /// Marks this client offline (best effort) and drops the subscription
    /// without giving up the seat.
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn detach(&mut self) {
        if self.active.is_none() {
            return;
        }
        if let Err(e) = self.mark_offline().await {
            warn!(error = %e, "Could not mark offline while detaching");
        }
        if let Some(active) = self.active.take() {
            info!(room_id = %active.id, "Detached from room");
        }
    }

    /// Waits for the next change to the active room.
    ///
    /// # Errors
    ///
    /// [`RoomError::NotInRoom`] when called outside a room.
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn next_view(&mut self) -> Result<Observation, RoomError> {
        let active = self.active.as_mut().ok_or(RoomError::NotInRoom)?;

        match active.watch.changed().await {
            Some(room) => {
                active.remember(&room);
                let view = RoomView::derive(Some(&room), &self.player);
                if view.phase == Phase::Lobby {
                    // Our seat was taken from us.
                    info!(room_id = %room.id, "No longer seated in room");
                    self.active = None;
                }
                Ok(Observation::Changed(view))
            }
            None => {
                info!(room_id = %active.id, "Room closed");
                self.active = None;
                Ok(Observation::Closed(Notice::RoomClosed))
            }
        }
    }

    async fn attach(&mut self, room: Room, seat: Seat) -> Result<(), RoomError> {
        let watch = match self.store.subscribe(&room.id).await {
            Ok(watch) => watch,
            Err(e) if e.kind == StoreErrorKind::NotFound => {
                return Err(RoomError::RoomNotFound(room.id));
            }
            Err(e) => return Err(RoomError::StoreWriteError(e)),
        };
        debug!(room_id = %room.id, ?seat, "Attached to room");
        self.active = Some(ActiveRoom {
            id: room.id.clone(),
            seat,
            watch,
            last_good: room,
        });
        Ok(())
    }

    fn active_seat(&self) -> Result<Seat, RoomError> {
        self.seat().ok_or(RoomError::NotInRoom)
    }

    /// Reads the active room fresh from the store.
    async fn fetch(&mut self) -> Result<Room, RoomError> {
        let id = self.room_id().cloned().ok_or(RoomError::NotInRoom)?;
        match self.store.get(&id).await? {
            Some(room) => {
                if let Some(active) = self.active.as_mut() {
                    active.remember(&room);
                }
                Ok(room)
            }
            None => {
                warn!(room_id = %id, "Room vanished");
                self.active = None;
                Err(RoomError::RoomNotFound(id))
            }
        }
    }

    async fn guarded_update(
        &mut self,
        id: &RoomId,
        guard: Guard,
        patch: RoomPatch,
    ) -> Result<UpdateOutcome, RoomError> {
        match self.store.update(id, guard, patch).await {
            Ok(outcome) => {
                if let Some(active) = self.active.as_mut() {
                    active.remember(outcome.room());
                }
                Ok(outcome)
            }
            Err(e) if e.kind == StoreErrorKind::NotFound => {
                warn!(room_id = %id, "Room vanished during update");
                self.active = None;
                Err(RoomError::RoomNotFound(id.clone()))
            }
            Err(e) => Err(RoomError::StoreWriteError(e)),
        }
    }

    async fn set_presence(&mut self, online: bool) -> Result<(), RoomError> {
        let seat = self.active_seat()?;
        let id = self.room_id().cloned().ok_or(RoomError::NotInRoom)?;

        let guard = match seat {
            Seat::Player1 => Guard::none(),
            Seat::Player2 => Guard::none().with(Condition::Player2Is(self.player.clone())),
        };
        let patch = RoomPatch::new().seat_online(seat, online);

        match self.guarded_update(&id, guard, patch).await? {
            UpdateOutcome::Applied(_) => {
                debug!(room_id = %id, ?seat, online, "Presence updated");
            }
            UpdateOutcome::Rejected(_) => {
                debug!(room_id = %id, "Seat no longer ours, presence not written");
            }
        }
        Ok(())
    }
}
