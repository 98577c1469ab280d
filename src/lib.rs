//! # BHML Site
//!
//! Core of a small esports league microsite: turns two JSON documents
//! (teams and matches) into match cards, per-map player stats tables and
//! a standings table.
//!
//! ## Architecture
//!
//! - **models**: Lenient data model for the two documents
//! - **calculate**: Match presentation, stats aggregation, standings, page views
//! - **storage**: Document loading, atomic writes, editable site files
//! - **api**: REST API and static site serving
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
