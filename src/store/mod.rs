//! Shared room store: the interface and its realizations.

mod error;
mod guard;
mod memory;
mod sqlite;
mod traits;
mod watch;

pub use error::{StoreError, StoreErrorKind};
pub use guard::{Condition, Guard, RoomPatch, UpdateOutcome};
pub use memory::MemoryStore;
pub use sqlite::{DEFAULT_POLL_INTERVAL, SqliteStore};
pub use traits::RoomStore;
pub use watch::RoomWatch;
