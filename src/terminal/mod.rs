//! Line-oriented terminal client.

mod input;
mod local;
mod online;
mod render;
mod solo;

pub use local::run_local;
pub use online::run_online;
pub use solo::run_solo;
