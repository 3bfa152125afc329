// src/watch/mod.rs

//! File watching and startup state.
//!
//! This module is responsible for:
//! - Deriving subject identifiers from save file names.
//! - Holding the content cache and modification-time table.
//! - Seeding that state from disk at startup.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** decide whether a change is real or talk to the endpoint;
//! that is the engine's job.

pub mod bootstrap;
pub mod cache;
pub mod identity;
pub mod watcher;

pub use bootstrap::{scan_directory, ScanSummary};
pub use cache::{ContentCache, TrackedState};
pub use identity::subject_id;
pub use watcher::{
    map_event, map_event_kind, spawn_watcher, WatchChannels, WatchSet, WatcherHandle,
};
