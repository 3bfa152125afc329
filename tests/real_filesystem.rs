// tests/real_filesystem.rs

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::tempdir;
use dinorelay::engine::{Reconciler, RelaySignal};
use dinorelay::fs::{FileSystem, RealFileSystem, SystemClock};
use dinorelay::types::EventKind;
use dinorelay::watch::{scan_directory, subject_id, TrackedState};

fn set_mtime(path: &Path, at: SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(at).unwrap();
}

fn written(path: &Path) -> RelaySignal {
    RelaySignal::Written {
        path: path.to_path_buf(),
        subject: subject_id(path).unwrap(),
    }
}

#[test]
fn bootstrap_then_write_and_delete_on_disk() {
    let dir = tempdir().unwrap();
    let save = dir.path().join("76561198000000001.json");
    fs::write(&save, "{\"hp\":100}").unwrap();
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    set_mtime(&save, t0);
    fs::create_dir(dir.path().join("archive")).unwrap();

    let fsys = RealFileSystem;
    let mut state = TrackedState::new();
    let summary = scan_directory(&fsys, dir.path(), false, &mut state);
    assert_eq!(summary.files_tracked, 1);
    assert_eq!(state.last_modified(&save), Some(t0));

    let mut core = Reconciler::new(Arc::new(RealFileSystem), Arc::new(SystemClock), state);

    // Rewrite but restore the old mtime: a coalesced duplicate.
    fs::write(&save, "{\"hp\":90}").unwrap();
    set_mtime(&save, t0);
    assert!(core.step(written(&save)).is_empty());

    set_mtime(&save, t0 + Duration::from_secs(3));
    let events = core.step(written(&save));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Changed);
    assert_eq!(events[0].content, "{\"hp\":90}");

    fs::remove_file(&save).unwrap();
    let events = core.step(RelaySignal::SweepTick);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Deleted);
    assert_eq!(events[0].content, "{\"hp\":90}");
    assert!(core.state().is_empty());
}

#[test]
fn directories_are_not_subjects() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("Players.old");
    fs::create_dir(&sub).unwrap();

    let core = Reconciler::new(Arc::new(RealFileSystem), Arc::new(SystemClock), TrackedState::new());
    assert_eq!(core.admit(&sub), None);
}

#[test]
fn binary_files_are_read_lossily() {
    let dir = tempdir().unwrap();
    let save = dir.path().join("bin.sav");
    fs::write(&save, [0x00, 0xff, b'o', b'k']).unwrap();

    let content = RealFileSystem.read_content(&save).unwrap();
    assert!(content.ends_with("ok"));
    assert!(content.contains('\u{FFFD}'));
}

#[test]
fn missing_path_does_not_exist() {
    let dir = tempdir().unwrap();
    assert!(!RealFileSystem.exists(&dir.path().join("gone.json")));
    assert!(RealFileSystem.exists(dir.path()));
}
