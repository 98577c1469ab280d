//! Core data models for the league site.

mod fixture;
mod snapshot;
mod stats;
mod team;
pub mod value;

pub use fixture::*;
pub use snapshot::*;
pub use stats::*;
pub use team::*;
