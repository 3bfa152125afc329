// src/lib.rs

pub mod cli;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::delivery::{AuthWallDetector, Dispatcher, HttpTransport, RetryPolicy};
use crate::engine::{Reconciler, Runtime, RuntimeOptions};
use crate::errors::{RelayError, Result};
use crate::fs::{FileSystem, RealFileSystem, SystemClock};
use crate::watch::{scan_directory, spawn_watcher, TrackedState, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the startup checks (watch dir present, watcher registered)
/// - the bootstrap scan
/// - HTTP delivery
/// - the reconciliation loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs, cfg: ConfigFile) -> Result<()> {
    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let root = cfg.watch.dir.clone();
    info!("=== starting dinorelay ===");
    info!(url = %cfg.endpoint.url, "watch path: {:?}", root);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    if !fs.is_dir(&root) {
        return Err(RelayError::MissingWatchDir(root.display().to_string()));
    }

    // Register before scanning so nothing written during the scan is missed.
    let (mut handle, channels) = spawn_watcher(&root)?;

    let mut state = TrackedState::new();
    let summary = scan_directory(fs.as_ref(), &root, cfg.watch.recursive, &mut state);
    for dir in &summary.subdirs {
        handle.add(dir)?;
    }

    let transport = HttpTransport::new(&cfg.endpoint)?;
    let dispatcher = Dispatcher::new(
        transport,
        RetryPolicy {
            max_attempts: cfg.delivery.max_attempts,
            delay: cfg.delivery.retry_delay,
        },
        AuthWallDetector::new(cfg.endpoint.auth_wall_markers.clone()),
        cfg.delivery.category.clone(),
    );

    let options = RuntimeOptions {
        poll_interval: cfg.watch.poll_interval,
        settle_delay: cfg.watch.settle_delay,
        recursive: cfg.watch.recursive,
    };

    let core = Reconciler::new(fs, Arc::new(SystemClock), state);
    let runtime = Runtime::new(
        core,
        dispatcher,
        channels.events,
        channels.errors,
        Box::new(handle),
        options,
    );

    tokio::select! {
        res = runtime.run() => res,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Ctrl-C received; shutting down"),
                Err(e) => warn!("failed to listen for Ctrl+C: {e}"),
            }
            Ok(())
        }
    }
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("dinorelay dry-run");
    println!("  watch.dir = {}", cfg.watch.dir.display());
    println!("  watch.recursive = {}", cfg.watch.recursive);
    println!("  watch.poll_interval = {:?}", cfg.watch.poll_interval);
    println!("  watch.settle_delay = {:?}", cfg.watch.settle_delay);
    println!();
    println!("  endpoint.url = {}", cfg.endpoint.url);
    println!("  endpoint.timeout = {:?}", cfg.endpoint.timeout);
    println!("  endpoint.user_agent = {}", cfg.endpoint.user_agent);
    println!("  endpoint.auth_wall_markers = {:?}", cfg.endpoint.auth_wall_markers);
    println!();
    println!("  delivery.max_attempts = {}", cfg.delivery.max_attempts);
    println!("  delivery.retry_delay = {:?}", cfg.delivery.retry_delay);
    println!("  delivery.category = {}", cfg.delivery.category);
    if let Some(ref file) = cfg.log.file {
        println!();
        println!("  log.file = {}", file.display());
    }
}
