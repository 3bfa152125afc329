// tests/relay_scenarios.rs

mod common;
use crate::common::{
    harness_options, init_tracing, mock_fs, save_path, FakeTransport, Harness,
};

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use dinorelay::engine::RuntimeOptions;
use dinorelay::types::FsOp;

const PLAYER: &str = "76561198000000001";

#[tokio::test(start_paused = true)]
async fn create_delivers_added_event() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    fs.write_file(save_path(PLAYER), "{\"hp\":100}");
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        r#"{"steamid64":"76561198000000001","type":"player","event":"add-dino-data","data":"{\"hp\":100}"}"#
    );
}

#[tokio::test(start_paused = true)]
async fn write_with_unchanged_mtime_is_not_delivered() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    fs.write_file(save_path(PLAYER), "{\"hp\":100}");
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    // Clock not advanced: same modification time as recorded on create.
    fs.write_file(save_path(PLAYER), "{\"hp\":50}");
    harness.notify(&save_path(PLAYER), FsOp::Write).await;
    harness.notify(&save_path(PLAYER), FsOp::Write).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["event"], "add-dino-data");
}

#[tokio::test(start_paused = true)]
async fn delete_reports_last_cached_content() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    fs.write_file(save_path(PLAYER), "{\"hp\":100}");
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    fs.clock().advance(Duration::from_secs(10));
    fs.write_file(save_path(PLAYER), "{\"hp\":50}");
    harness.notify(&save_path(PLAYER), FsOp::Write).await;

    fs.remove(save_path(PLAYER));
    harness.notify(&save_path(PLAYER), FsOp::Remove).await;

    let sent = harness.finish().await;
    let bodies: Vec<_> = sent.iter().map(|r| r.json()).collect();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[1]["event"], "change-dino-data");
    assert_eq!(bodies[1]["data"], "{\"hp\":50}");
    assert_eq!(
        bodies[2],
        json!({
            "steamid64": PLAYER,
            "type": "player",
            "event": "delete-dino-data",
            "data": "{\"hp\":50}",
        })
    );
}

#[tokio::test(start_paused = true)]
async fn delete_of_unknown_file_sends_empty_object() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    harness.notify(&save_path("42"), FsOp::Remove).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["event"], "delete-dino-data");
    assert_eq!(sent[0].json()["data"], "{}");
}

#[tokio::test(start_paused = true)]
async fn bootstrap_seeds_content_for_deletes() {
    init_tracing();
    let fs = mock_fs();
    fs.write_file(save_path(PLAYER), "{\"hp\":75}");
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    // Same mtime as seeded: a stray write notification is not a change.
    harness.notify(&save_path(PLAYER), FsOp::Write).await;

    fs.remove(save_path(PLAYER));
    harness.notify(&save_path(PLAYER), FsOp::Remove).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["event"], "delete-dino-data");
    assert_eq!(sent[0].json()["data"], "{\"hp\":75}");
}

#[tokio::test(start_paused = true)]
async fn sweep_catches_deletes_without_notification() {
    init_tracing();
    let fs = mock_fs();
    fs.write_file(save_path(PLAYER), "{\"hp\":1}");
    let options = RuntimeOptions {
        poll_interval: Duration::from_secs(2),
        ..harness_options()
    };
    let harness = Harness::start_with(fs.clone(), FakeTransport::new(), options);

    fs.remove(save_path(PLAYER));
    // No Remove notification; the periodic sweep has to notice. Odd offsets
    // keep notifications off the even-second sweep ticks.
    tokio::time::sleep(Duration::from_secs(5)).await;

    // A late notification for the same path must not duplicate the data.
    harness.notify(&save_path(PLAYER), FsOp::Remove).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].json()["data"], "{\"hp\":1}");
    assert_eq!(sent[1].json()["data"], "{}");
}

#[tokio::test(start_paused = true)]
async fn atomic_save_by_rename_is_reported_as_added() {
    init_tracing();
    let fs = mock_fs();
    fs.write_file(save_path(PLAYER), "{\"hp\":1}");
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    // Writer stages the new save next to the old one, then renames it over.
    let staged = format!("{}.tmp", save_path(PLAYER));
    fs.clock().advance(Duration::from_secs(3));
    fs.write_file(save_path(PLAYER), "{\"hp\":2}");
    harness.notify(&staged, FsOp::Rename).await;
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    fs.remove(save_path(PLAYER));
    harness.notify(&save_path(PLAYER), FsOp::Remove).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].json()["event"], "add-dino-data");
    assert_eq!(sent[0].json()["data"], "{\"hp\":2}");
    assert_eq!(sent[1].json()["event"], "delete-dino-data");
    assert_eq!(sent[1].json()["data"], "{\"hp\":2}");
}

#[tokio::test(start_paused = true)]
async fn invalid_and_binary_content_is_wrapped_as_string() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    fs.write_file(save_path("1"), "hp=\"full\"\n");
    harness.notify(&save_path("1"), FsOp::Create).await;
    fs.write_file(save_path("2"), vec![0xff, 0xfe, b'{']);
    harness.notify(&save_path("2"), FsOp::Create).await;
    fs.write_file(save_path("3"), "   ");
    harness.notify(&save_path("3"), FsOp::Create).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 3);
    for req in &sent {
        let data = req.json()["data"].as_str().unwrap().to_string();
        assert!(
            serde_json::from_str::<serde_json::Value>(&data).is_ok(),
            "data is not valid JSON: {data}"
        );
    }
    let first: String = serde_json::from_str(sent[0].json()["data"].as_str().unwrap()).unwrap();
    assert_eq!(first, "hp=\"full\"\n");
    assert_eq!(sent[2].json()["data"], "{}");
}

#[tokio::test(start_paused = true)]
async fn directories_and_renames_are_ignored() {
    init_tracing();
    let fs = mock_fs();
    fs.add_dir("/saves/backup");
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    harness.notify("/saves/backup", FsOp::Create).await;
    fs.write_file(save_path(PLAYER), "{}");
    harness.notify(&save_path(PLAYER), FsOp::Rename).await;

    let sent = harness.finish().await;
    assert!(sent.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unreadable_create_is_dropped_and_later_write_still_reported() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    fs.write_file(save_path(PLAYER), "{\"hp\":1}");
    fs.set_unreadable(save_path(PLAYER));
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    fs.write_file(save_path(PLAYER), "{\"hp\":2}");
    harness.notify(&save_path(PLAYER), FsOp::Write).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["event"], "change-dino-data");
    assert_eq!(sent[0].json()["data"], "{\"hp\":2}");
}

#[tokio::test(start_paused = true)]
async fn watcher_errors_do_not_stop_the_loop() {
    init_tracing();
    let fs = mock_fs();
    let harness = Harness::start(fs.clone(), FakeTransport::new());

    harness.watcher_error("queue overflow").await;
    fs.write_file(save_path(PLAYER), "{}");
    harness.notify(&save_path(PLAYER), FsOp::Create).await;

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn recursive_mode_registers_new_directories() {
    init_tracing();
    let fs = mock_fs();
    let options = RuntimeOptions {
        recursive: true,
        ..harness_options()
    };
    let harness = Harness::start_with(fs.clone(), FakeTransport::new(), options);

    fs.write_file("/saves/season2/7.json", "{\"hp\":7}");
    harness.notify("/saves/season2", FsOp::Create).await;

    fs.clock().advance(Duration::from_secs(1));
    fs.write_file("/saves/season2/7.json", "{\"hp\":8}");
    harness.notify("/saves/season2/7.json", FsOp::Write).await;

    let watched = harness.watched.lock().unwrap().clone();
    assert_eq!(watched, vec![Path::new("/saves/season2").to_path_buf()]);

    let sent = harness.finish().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json()["steamid64"], "7");
    assert_eq!(sent[0].json()["event"], "change-dino-data");
}
