//! Two-player rooms: the shared record, the per-client view and the
//! session state machine that reconciles the two.

mod error;
mod model;
mod session;
mod view;

pub use error::{Ack, Notice, RoomError};
pub use model::{CODE_LEN, PlayerId, Room, RoomId, RoomStatus, Seat};
pub use session::{Observation, Resolution, RoomSession};
pub use view::{Phase, RoomView};
