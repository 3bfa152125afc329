// src/engine/core.rs

//! Per-file reconciliation state machine.
//!
//! [`Reconciler`] owns the tracked state (modification times + content
//! cache) and turns [`RelaySignal`]s into the [`RelayEvent`]s that should be
//! delivered. It never talks to the network and never sleeps; the settle
//! delay and delivery are the runtime's job.
//!
//! Per-file I/O failures are logged and the signal is dropped without
//! touching the file's tracked state, so a later event is still handled.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::RelaySignal;
use crate::fs::{Clock, FileSystem};
use crate::logging::truncate_for_log;
use crate::types::{EventKind, RelayEvent};
use crate::watch::bootstrap::{scan_directory, ScanSummary};
use crate::watch::cache::TrackedState;
use crate::watch::identity::subject_id;

#[derive(Debug)]
pub struct Reconciler {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    state: TrackedState,
}

impl Reconciler {
    pub fn new(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>, state: TrackedState) -> Self {
        Self { fs, clock, state }
    }

    pub fn state(&self) -> &TrackedState {
        &self.state
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }

    /// Directory guard plus identity resolution. `None` means the path is
    /// not a subject file and its event should be discarded.
    pub fn admit(&self, path: &Path) -> Option<String> {
        if self.fs.is_dir(path) {
            return None;
        }
        subject_id(path)
    }

    /// Seed state for a directory that appeared after startup.
    pub fn seed_dir(&mut self, dir: &Path, recursive: bool) -> ScanSummary {
        scan_directory(self.fs.as_ref(), dir, recursive, &mut self.state)
    }

    /// Handle a single signal, returning the events to deliver in order.
    pub fn step(&mut self, signal: RelaySignal) -> Vec<RelayEvent> {
        match signal {
            RelaySignal::Created { path, subject } => {
                self.on_create(&path, subject).into_iter().collect()
            }
            RelaySignal::Written { path, subject } => {
                self.on_write(&path, subject).into_iter().collect()
            }
            RelaySignal::Removed { path, subject } => vec![self.on_remove(&path, subject)],
            RelaySignal::SweepTick => self.sweep(),
        }
    }

    /// A file appeared. Caches its content and stamps it with the current
    /// time.
    pub fn on_create(&mut self, path: &Path, subject: String) -> Option<RelayEvent> {
        let content = match self.fs.read_content(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("error reading created file {:?}: {:#}", path, e);
                return None;
            }
        };

        self.state.cache_mut().put(path, content.clone());
        self.state.record_modified(path, self.clock.now());

        Some(RelayEvent {
            subject,
            kind: EventKind::Added,
            content,
        })
    }

    /// A file was written. Only reported when its modification time moved.
    pub fn on_write(&mut self, path: &Path, subject: String) -> Option<RelayEvent> {
        let modified = match self.fs.modified(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("error stating file {:?}: {:#}", path, e);
                return None;
            }
        };

        if self.state.last_modified(path) == Some(modified) {
            debug!("duplicate write notification for {:?}", path);
            return None;
        }

        let content = match self.fs.read_content(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("error reading modified file {:?}: {:#}", path, e);
                return None;
            }
        };

        self.state.cache_mut().put(path, content.clone());
        self.state.record_modified(path, modified);

        Some(RelayEvent {
            subject,
            kind: EventKind::Changed,
            content,
        })
    }

    /// A file is gone. Reports the last cached content (empty if none) and
    /// forgets the path.
    pub fn on_remove(&mut self, path: &Path, subject: String) -> RelayEvent {
        let content = self
            .state
            .cache()
            .get(path)
            .map(str::to_string)
            .unwrap_or_default();
        self.state.forget(path);

        debug!(content = %truncate_for_log(&content), "reporting removal of {:?}", path);
        RelayEvent {
            subject,
            kind: EventKind::Deleted,
            content,
        }
    }

    /// Report every tracked path that no longer exists on disk.
    pub fn sweep(&mut self) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        for path in self.state.tracked_paths() {
            if self.fs.exists(&path) {
                continue;
            }
            match subject_id(&path) {
                Some(subject) => {
                    info!("detected deleted file {:?}", path);
                    events.push(self.on_remove(&path, subject));
                }
                None => self.state.forget(&path),
            }
        }
        events
    }
}
