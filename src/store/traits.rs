//! The shared room store interface.

use async_trait::async_trait;

use crate::room::{Room, RoomId};
use crate::store::{Guard, RoomPatch, RoomWatch, StoreError, UpdateOutcome};

/// A key-value store of rooms with change notification.
///
/// Implementations must evaluate the [`Guard`] of [`RoomStore::update`]
/// atomically with the write: two concurrent updates whose guards both
/// hold against the same prior record must not both be applied.
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new room. Fails with `Conflict` if the id is taken.
    async fn insert(&self, room: Room) -> Result<Room, StoreError>;

    /// Reads a room.
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, StoreError>;

    /// Applies `patch` if `guard` holds. Fails with `NotFound` if the
    /// room does not exist. An empty patch whose guard holds writes
    /// nothing and returns the record unchanged.
    async fn update(
        &self,
        id: &RoomId,
        guard: Guard,
        patch: RoomPatch,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Deletes a room. Deleting a missing room is not an error.
    async fn delete(&self, id: &RoomId) -> Result<(), StoreError>;

    /// Subscribes to changes of one room. Fails with `NotFound` if the
    /// room does not exist.
    async fn subscribe(&self, id: &RoomId) -> Result<RoomWatch, StoreError>;
}
