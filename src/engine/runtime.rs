// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::delivery::{Dispatcher, Transport};
use crate::errors::Result;
use crate::types::{FsEvent, FsOp, RelayEvent};
use crate::watch::WatchSet;

use super::core::Reconciler;
use super::{RelaySignal, RuntimeOptions};

/// Drives the [`Reconciler`] from filesystem events and a sweep timer, and
/// hands the resulting events to a [`Dispatcher`].
///
/// Everything runs on one logical thread of control: each loop iteration
/// takes whichever input is ready first, processes it completely (including
/// any settle delay and delivery retries), then loops.
pub struct Runtime<T: Transport> {
    core: Reconciler,
    dispatcher: Dispatcher<T>,
    events: mpsc::UnboundedReceiver<FsEvent>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    watch_set: Box<dyn WatchSet>,
    options: RuntimeOptions,
}

impl<T: Transport> fmt::Debug for Runtime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Runtime<T> {
    pub fn new(
        core: Reconciler,
        dispatcher: Dispatcher<T>,
        events: mpsc::UnboundedReceiver<FsEvent>,
        errors: mpsc::UnboundedReceiver<notify::Error>,
        watch_set: Box<dyn WatchSet>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            core,
            dispatcher,
            events,
            errors,
            watch_set,
            options,
        }
    }

    /// Main event loop. Returns when either watcher channel closes.
    pub async fn run(mut self) -> Result<()> {
        info!("dinorelay runtime started");

        let mut sweep = interval(self.options.poll_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; bootstrap already ran.
        sweep.tick().await;

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_fs_event(event).await,
                    None => {
                        info!("watch event channel closed; exiting");
                        break;
                    }
                },
                err = self.errors.recv() => match err {
                    Some(err) => warn!("watcher error: {err}"),
                    None => {
                        info!("watch error channel closed; exiting");
                        break;
                    }
                },
                _ = sweep.tick() => {
                    let events = self.core.step(RelaySignal::SweepTick);
                    self.deliver_all(events).await;
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn handle_fs_event(&mut self, event: FsEvent) {
        let FsEvent { path, op } = event;

        if op == FsOp::Rename {
            // Moves in arrive as creates; the sweep reports the old path once
            // it is gone from disk.
            debug!("ignoring rename notification for {:?}", path);
            return;
        }

        if self.options.recursive && op == FsOp::Create && self.core.is_dir(&path) {
            self.register_dir(path);
            return;
        }

        let Some(subject) = self.core.admit(&path) else {
            debug!("discarding event for non-subject path {:?}", path);
            return;
        };

        info!(op = ?op, subject = %subject, "file event for {:?}", path);

        let signal = match op {
            FsOp::Create => {
                sleep(self.options.settle_delay).await;
                RelaySignal::Created { path, subject }
            }
            FsOp::Write => RelaySignal::Written { path, subject },
            FsOp::Remove => RelaySignal::Removed { path, subject },
            FsOp::Rename => return,
        };

        let events = self.core.step(signal);
        self.deliver_all(events).await;
    }

    /// Add a newly created directory (and anything already inside it) to
    /// the watch set and seed its files.
    fn register_dir(&mut self, dir: PathBuf) {
        if let Err(e) = self.watch_set.add(&dir) {
            warn!("failed to watch new directory {:?}: {}", dir, e);
            return;
        }
        let summary = self.core.seed_dir(&dir, true);
        for sub in summary.subdirs {
            if let Err(e) = self.watch_set.add(&sub) {
                warn!("failed to watch new directory {:?}: {}", sub, e);
            }
        }
    }

    async fn deliver_all(&mut self, events: Vec<RelayEvent>) {
        for event in events {
            self.dispatcher.deliver(&event).await;
        }
    }
}
