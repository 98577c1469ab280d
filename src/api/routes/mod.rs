//! Route handlers, grouped by audience.

pub mod data;
pub mod files;
pub mod site;
