//! Game rules.

pub mod rps;
