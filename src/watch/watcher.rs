// src/watch/watcher.rs

use std::path::Path;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::types::{FsEvent, FsOp};

/// The part of the watch capability the relay loop drives directly:
/// registering directories discovered after startup.
pub trait WatchSet: Send {
    fn add(&mut self, path: &Path) -> Result<()>;
}

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching and close
/// both channels in [`WatchChannels`].
pub struct WatcherHandle {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl WatchSet for WatcherHandle {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.inner.watch(path, RecursiveMode::NonRecursive)?;
        info!("added {:?} to watch set", path);
        Ok(())
    }
}

/// Receiving ends fed by the notify callback.
#[derive(Debug)]
pub struct WatchChannels {
    pub events: mpsc::UnboundedReceiver<FsEvent>,
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

/// Start watching `root` (non-recursively) and return the handle plus the
/// event and error channels.
pub fn spawn_watcher(root: &Path) -> Result<(WatcherHandle, WatchChannels)> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<FsEvent>();
    let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for fs_event in map_event(event) {
                    if let Err(err) = event_tx.send(fs_event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("dinorelay: failed to forward notify event: {err}");
                    }
                }
            }
            Err(err) => {
                if error_tx.send(err).is_err() {
                    eprintln!("dinorelay: watch error channel closed");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(root, RecursiveMode::NonRecursive)?;
    info!("file watcher started on {:?}", root);

    Ok((
        WatcherHandle { inner: watcher },
        WatchChannels {
            events: event_rx,
            errors: error_rx,
        },
    ))
}

/// Turn one notify event into per-path relay events.
///
/// A rename carrying both ends (`RenameMode::Both`) lists the old path first
/// and the new path second; the new path is reported as a create so that
/// files moved into the directory (atomic saves) are picked up.
pub fn map_event(event: Event) -> Vec<FsEvent> {
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        let mut paths = event.paths.into_iter();
        let from = paths.next().map(|p| FsEvent::new(p, FsOp::Rename));
        let to = paths.next().map(|p| FsEvent::new(p, FsOp::Create));
        return from.into_iter().chain(to).collect();
    }

    let Some(op) = map_event_kind(&event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .into_iter()
        .map(|path| FsEvent::new(path, op))
        .collect()
}

/// Map a notify event kind onto the four operations the relay understands.
///
/// The destination side of a move counts as a create. Metadata-only
/// modifications and access events are dropped.
pub fn map_event_kind(kind: &EventKind) -> Option<FsOp> {
    let op = match kind {
        EventKind::Create(_) => FsOp::Create,
        EventKind::Remove(_) => FsOp::Remove,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FsOp::Create,
        EventKind::Modify(ModifyKind::Name(_)) => FsOp::Rename,
        EventKind::Modify(ModifyKind::Metadata(_)) => return None,
        EventKind::Modify(_) => FsOp::Write,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {
            debug!(?kind, "ignoring notify event kind");
            return None;
        }
    };
    Some(op)
}
