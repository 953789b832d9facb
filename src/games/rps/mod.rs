mod rules;
mod types;

pub use rules::{resolve, resolve_pair};
pub use types::{Move, Outcome};
