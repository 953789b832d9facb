//! Row model for the `rooms` table.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::instrument;

use super::schema;
use crate::games::rps::Move;
use crate::room::{PlayerId, Room, RoomId, RoomStatus};
use crate::store::StoreError;

/// One room as stored. Enums are kept as their display strings.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = schema::rooms)]
#[diesel(treat_none_as_null = true)]
pub struct RoomRow {
    id: String,
    player1_id: String,
    player2_id: Option<String>,
    player1_move: Option<String>,
    player2_move: Option<String>,
    player1_score: i32,
    player2_score: i32,
    target_score: i32,
    status: String,
    round: i32,
    game: i32,
    player1_online: bool,
    player2_online: bool,
    last_activity: NaiveDateTime,
}

impl RoomRow {
    /// The primary key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Converts the row into a domain [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a stored enum or counter is malformed.
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub fn into_room(self) -> Result<Room, StoreError> {
        let id = RoomId::parse(&self.id)
            .ok_or_else(|| StoreError::backend(format!("Invalid stored room id '{}'", self.id)))?;

        Ok(Room {
            id,
            player1_id: PlayerId::from(self.player1_id),
            player2_id: self.player2_id.map(PlayerId::from),
            player1_move: parse_move(self.player1_move.as_deref())?,
            player2_move: parse_move(self.player2_move.as_deref())?,
            player1_score: to_count(self.player1_score, "player1_score")?,
            player2_score: to_count(self.player2_score, "player2_score")?,
            target_score: to_count(self.target_score, "target_score")?,
            status: RoomStatus::from_str(&self.status).map_err(|_| {
                StoreError::backend(format!("Invalid stored status '{}'", self.status))
            })?,
            round: to_count(self.round, "round")?,
            game: to_count(self.game, "game")?,
            player1_online: self.player1_online,
            player2_online: self.player2_online,
            last_activity: DateTime::from_naive_utc_and_offset(self.last_activity, Utc),
        })
    }
}

impl TryFrom<&Room> for RoomRow {
    type Error = StoreError;

    fn try_from(room: &Room) -> Result<Self, Self::Error> {
        Ok(Self {
            id: room.id.as_str().to_string(),
            player1_id: room.player1_id.as_str().to_string(),
            player2_id: room.player2_id.as_ref().map(|p| p.as_str().to_string()),
            player1_move: room.player1_move.map(|m| m.to_string()),
            player2_move: room.player2_move.map(|m| m.to_string()),
            player1_score: to_column(room.player1_score, "player1_score")?,
            player2_score: to_column(room.player2_score, "player2_score")?,
            target_score: to_column(room.target_score, "target_score")?,
            status: room.status.to_string(),
            round: to_column(room.round, "round")?,
            game: to_column(room.game, "game")?,
            player1_online: room.player1_online,
            player2_online: room.player2_online,
            last_activity: room.last_activity.naive_utc(),
        })
    }
}

fn parse_move(stored: Option<&str>) -> Result<Option<Move>, StoreError> {
    stored
        .map(|s| {
            Move::from_str(s)
                .map_err(|_| StoreError::backend(format!("Invalid stored move '{}'", s)))
        })
        .transpose()
}

fn to_count(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::backend(format!("Negative value {} in column {}", value, column)))
}

fn to_column(value: u32, column: &str) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::backend(format!("Value {} overflows column {}", value, column)))
}
