//! In-process room store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::room::{Room, RoomId};
use crate::store::{Guard, RoomPatch, RoomStore, RoomWatch, StoreError, UpdateOutcome};

type RoomMap = HashMap<RoomId, watch::Sender<Option<Room>>>;

/// Rooms held in memory, shared by every session in the process.
///
/// Each room lives inside its own watch channel, so the channel's current
/// value is the record and every write doubles as the change notification.
/// Used for hot-seat play and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rooms: Arc<Mutex<RoomMap>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory room store");
        Self::default()
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.lock().map(|rooms| rooms.len()).unwrap_or(0)
    }

    /// Whether the store holds no rooms.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, RoomMap>, StoreError> {
        self.rooms
            .lock()
            .map_err(|e| StoreError::backend(format!("Room map lock poisoned: {}", e)))
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn insert(&self, mut room: Room) -> Result<Room, StoreError> {
        let mut rooms = self.lock()?;
        if rooms.contains_key(&room.id) {
            warn!("Room id already taken");
            return Err(StoreError::conflict(format!("Room {} already exists", room.id)));
        }
        room.last_activity = Utc::now();
        let (tx, _) = watch::channel(Some(room.clone()));
        rooms.insert(room.id.clone(), tx);
        info!("Room inserted");
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        let rooms = self.lock()?;
        Ok(rooms.get(id).and_then(|tx| tx.borrow().clone()))
    }

    #[instrument(skip(self, guard, patch))]
    async fn update(
        &self,
        id: &RoomId,
        guard: Guard,
        patch: RoomPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let rooms = self.lock()?;
        let tx = rooms
            .get(id)
            .ok_or_else(|| StoreError::not_found(format!("Room {} not found", id)))?;

        let current = tx
            .borrow()
            .clone()
            .ok_or_else(|| StoreError::not_found(format!("Room {} was deleted", id)))?;

        if !guard.holds(&current) {
            debug!(conditions = ?guard.conditions(), "Guard rejected update");
            return Ok(UpdateOutcome::Rejected(current));
        }
        if patch.is_empty() {
            return Ok(UpdateOutcome::Applied(current));
        }

        let mut next = current;
        patch.apply(&mut next);
        next.last_activity = Utc::now();
        tx.send_replace(Some(next.clone()));
        debug!(status = %next.status, round = next.round, game = next.game, "Room updated");
        Ok(UpdateOutcome::Applied(next))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RoomId) -> Result<(), StoreError> {
        let mut rooms = self.lock()?;
        if let Some(tx) = rooms.remove(id) {
            tx.send_replace(None);
            info!("Room deleted");
        } else {
            debug!("Delete of unknown room ignored");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, id: &RoomId) -> Result<RoomWatch, StoreError> {
        let rooms = self.lock()?;
        let tx = rooms
            .get(id)
            .ok_or_else(|| StoreError::not_found(format!("Room {} not found", id)))?;
        debug!(subscribers = tx.receiver_count() + 1, "Subscribed to room");
        Ok(RoomWatch::new(tx.subscribe()))
    }
}
