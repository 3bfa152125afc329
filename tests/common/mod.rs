#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dinorelay::delivery::{AuthWallDetector, Dispatcher, RetryPolicy};
use dinorelay::engine::{Reconciler, Runtime, RuntimeOptions};
use dinorelay::errors::Result;
use dinorelay::fs::mock::MockFileSystem;
use dinorelay::fs::{FileSystem, MockClock};
use dinorelay::types::{FsEvent, FsOp};
use dinorelay::watch::{scan_directory, TrackedState, WatchSet};
pub use dinorelay_test_utils::fake_transport::{FakeTransport, SentRequest};
pub use dinorelay_test_utils::init_tracing;

pub const SAVES: &str = "/saves";

/// Watch set that only records what it was asked to add.
#[derive(Debug, Clone, Default)]
pub struct RecordingWatchSet {
    pub added: Arc<Mutex<Vec<PathBuf>>>,
}

impl WatchSet for RecordingWatchSet {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.added.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// A runtime running on its own task against a mock filesystem and a fake
/// transport. Meant for `#[tokio::test(start_paused = true)]`.
pub struct Harness {
    pub fs: MockFileSystem,
    pub transport: FakeTransport,
    pub watched: Arc<Mutex<Vec<PathBuf>>>,
    events: mpsc::UnboundedSender<FsEvent>,
    errors: mpsc::UnboundedSender<notify::Error>,
    task: JoinHandle<Result<()>>,
}

impl Harness {
    /// Start with [`harness_options`], so no sweep fires during a test.
    pub fn start(fs: MockFileSystem, transport: FakeTransport) -> Self {
        Self::start_with(fs, transport, harness_options())
    }

    pub fn start_with(fs: MockFileSystem, transport: FakeTransport, options: RuntimeOptions) -> Self {
        let mut state = TrackedState::new();
        scan_directory(&fs, Path::new(SAVES), options.recursive, &mut state);

        let core = Reconciler::new(
            Arc::new(fs.clone()) as Arc<dyn FileSystem>,
            Arc::new(fs.clock().clone()),
            state,
        );
        let dispatcher = Dispatcher::new(
            transport.clone(),
            RetryPolicy::default(),
            AuthWallDetector::default(),
            "player",
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let watch_set = RecordingWatchSet::default();
        let watched = Arc::clone(&watch_set.added);

        let runtime = Runtime::new(
            core,
            dispatcher,
            events_rx,
            errors_rx,
            Box::new(watch_set),
            options,
        );
        let task = tokio::spawn(runtime.run());

        Self {
            fs,
            transport,
            watched,
            events: events_tx,
            errors: errors_tx,
            task,
        }
    }

    /// Send one notification and let the runtime fully process it.
    pub async fn notify(&self, path: &str, op: FsOp) {
        self.events
            .send(FsEvent::new(path, op))
            .expect("runtime stopped early");
        settle().await;
    }

    pub async fn watcher_error(&self, msg: &str) {
        self.errors
            .send(notify::Error::generic(msg))
            .expect("runtime stopped early");
        settle().await;
    }

    /// Close the event source and wait for the loop to exit.
    pub async fn finish(self) -> Vec<SentRequest> {
        drop(self.events);
        let result = tokio::time::timeout(Duration::from_secs(60), self.task)
            .await
            .expect("runtime did not exit after the event channel closed")
            .expect("runtime task panicked");
        assert!(result.is_ok(), "runtime returned an error: {result:?}");
        drop(self.errors);
        self.transport.sent()
    }
}

/// How far [`settle`] moves paused time.
pub const SETTLE: Duration = Duration::from_secs(30);

/// Let paused time run forward far enough for settle delays and retries.
pub async fn settle() {
    tokio::time::sleep(SETTLE).await;
}

/// Runtime options whose sweep interval is far longer than any test runs.
///
/// A sweep tick due at the same paused instant as a notification races it
/// inside `select!`, so only tests that exercise the sweep turn it on.
pub fn harness_options() -> RuntimeOptions {
    RuntimeOptions {
        poll_interval: Duration::from_secs(24 * 60 * 60),
        ..RuntimeOptions::default()
    }
}

pub fn mock_fs() -> MockFileSystem {
    let fs = MockFileSystem::new(MockClock::new());
    fs.add_dir(SAVES);
    fs
}

pub fn save_path(subject: &str) -> String {
    format!("{SAVES}/{subject}.json")
}
