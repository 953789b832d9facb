//! SQLite-backed room store.

mod models;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use store::{DEFAULT_POLL_INTERVAL, SqliteStore};
