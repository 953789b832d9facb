//! Change subscriptions.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::room::Room;

/// A live subscription to one room.
///
/// Holds the latest observed record (`None` once the room is deleted).
/// Dropping the handle stops any background poller feeding it.
#[derive(Debug)]
pub struct RoomWatch {
    rx: watch::Receiver<Option<Room>>,
    poller: Option<JoinHandle<()>>,
}

impl RoomWatch {
    /// Wraps a receiver fed directly by the store.
    pub fn new(rx: watch::Receiver<Option<Room>>) -> Self {
        Self { rx, poller: None }
    }

    /// Wraps a receiver fed by a background task owned by this handle.
    pub fn with_poller(rx: watch::Receiver<Option<Room>>, poller: JoinHandle<()>) -> Self {
        Self {
            rx,
            poller: Some(poller),
        }
    }

    /// The most recent record without waiting.
    pub fn current(&self) -> Option<Room> {
        self.rx.borrow().clone()
    }

    /// Waits for the next change and returns the new record.
    ///
    /// Returns `None` when the room was deleted or the feed closed.
    #[instrument(skip(self))]
    pub async fn changed(&mut self) -> Option<Room> {
        match self.rx.changed().await {
            Ok(()) => self.rx.borrow_and_update().clone(),
            Err(_) => {
                debug!("Room feed closed");
                None
            }
        }
    }
}

impl Drop for RoomWatch {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}
