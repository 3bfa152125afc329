// src/engine/mod.rs

//! Reconciliation engine for dinorelay.
//!
//! This module ties together:
//! - the per-file state machine deciding whether a notification is a real
//!   change (create / write / remove / periodic sweep)
//! - the main loop that multiplexes filesystem events, watcher errors and
//!   the sweep timer, and hands resulting events to delivery
//!
//! The synchronous state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;
use std::time::Duration;

/// A change signal for a path that has already passed the directory guard
/// and identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelaySignal {
    Created { path: PathBuf, subject: String },
    Written { path: PathBuf, subject: String },
    Removed { path: PathBuf, subject: String },
    /// Periodic check for tracked files that vanished without a notification.
    SweepTick,
}

/// Timing and mode options for the runtime loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    /// Register directories created under the watch root.
    pub recursive: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            settle_delay: Duration::from_millis(100),
            recursive: false,
        }
    }
}

pub mod core;
pub mod runtime;

pub use self::core::Reconciler;
pub use runtime::Runtime;
