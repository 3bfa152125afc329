// src/watch/bootstrap.rs

//! One-shot startup scan that seeds modification times and cached content
//! for files already present in the watched directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::logging::truncate_for_log;
use crate::watch::cache::TrackedState;

/// What a bootstrap scan found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files that now have a modification-time entry.
    pub files_tracked: usize,
    /// Of those, files whose content could not be read.
    pub unreadable: usize,
    /// Subdirectories discovered (only populated when scanning recursively).
    pub subdirs: Vec<PathBuf>,
}

/// Seed `state` from the files under `root`.
///
/// Directories are skipped unless `recursive` is set, in which case they are
/// descended into and reported in [`ScanSummary::subdirs`] so the caller can
/// add them to the watch set. A file that cannot be stat'ed is skipped; a
/// file that can be stat'ed but not read keeps only its modification time.
pub fn scan_directory(
    fs: &dyn FileSystem,
    root: &Path,
    recursive: bool,
    state: &mut TrackedState,
) -> ScanSummary {
    let mut summary = ScanSummary::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("error reading directory {:?}: {:#}", dir, e);
                continue;
            }
        };

        for path in entries {
            if fs.is_dir(&path) {
                if recursive {
                    summary.subdirs.push(path.clone());
                    pending.push(path);
                }
                continue;
            }
            seed_file(fs, &path, state, &mut summary);
        }
    }

    info!(
        files = summary.files_tracked,
        unreadable = summary.unreadable,
        subdirs = summary.subdirs.len(),
        "initialized tracking for {:?}",
        root
    );
    summary
}

fn seed_file(
    fs: &dyn FileSystem,
    path: &Path,
    state: &mut TrackedState,
    summary: &mut ScanSummary,
) {
    let modified = match fs.modified(path) {
        Ok(t) => t,
        Err(e) => {
            debug!("skipping {:?} during scan: {:#}", path, e);
            return;
        }
    };
    state.record_modified(path, modified);
    summary.files_tracked += 1;

    match fs.read_content(path) {
        Ok(content) => {
            debug!(content = %truncate_for_log(&content), "cached content for {:?}", path);
            state.cache_mut().put(path, content);
        }
        Err(e) => {
            summary.unreadable += 1;
            warn!("error caching file {:?}: {:#}", path, e);
        }
    }
}
