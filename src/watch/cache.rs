// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// In-memory cache of the last content read from each save file.
///
/// Kept so a delete can still report what the file held. Lives for the
/// process lifetime only; a restart re-seeds it from disk.
#[derive(Debug, Default)]
pub struct ContentCache {
    contents: HashMap<PathBuf, String>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self {
            contents: HashMap::new(),
        }
    }

    pub fn put(&mut self, path: &Path, content: String) {
        self.contents.insert(path.to_path_buf(), content);
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        let removed = self.contents.remove(path);
        if removed.is_some() {
            debug!("evicted cached content for {:?}", path);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Everything the relay knows about watched files: the last recorded
/// modification time per path plus the content cache.
///
/// A path is tracked once it has a modification-time entry. Content may be
/// absent (e.g. the file could be stat'ed but not read at startup).
#[derive(Debug, Default)]
pub struct TrackedState {
    modified: HashMap<PathBuf, SystemTime>,
    cache: ContentCache,
}

impl TrackedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_modified(&self, path: &Path) -> Option<SystemTime> {
        self.modified.get(path).copied()
    }

    pub fn record_modified(&mut self, path: &Path, at: SystemTime) {
        self.modified.insert(path.to_path_buf(), at);
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ContentCache {
        &mut self.cache
    }

    /// Snapshot of tracked paths, sorted for deterministic sweeps.
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.modified.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.modified.contains_key(path) || self.cache.get(path).is_some()
    }

    /// Drop every trace of `path`.
    pub fn forget(&mut self, path: &Path) {
        self.modified.remove(path);
        self.cache.remove(path);
    }

    pub fn len(&self) -> usize {
        self.modified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }
}
