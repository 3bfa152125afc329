// src/logging.rs

//! Logging setup for `dinorelay` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `[log].level` in the config file
//! 3. `DINORELAY_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `info`
//!
//! Logs always go to STDERR. When `[log].file` is set, the same events are
//! also appended to that file.

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LogSettings;
use crate::types::LogLevel;

/// Bodies and payloads longer than this are cut in log lines.
pub const LOG_TRUNCATE_BYTES: usize = 500;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup. Fails if the log file cannot be opened.
pub fn init_logging(cli_level: Option<LogLevel>, settings: &LogSettings) -> Result<()> {
    let level = resolve_level(cli_level, settings.level);

    let file_layer = match settings.file {
        Some(ref path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {:?}", path))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, config_level: Option<LogLevel>) -> tracing::Level {
    match cli_level.or(config_level) {
        Some(lvl) => lvl.into(),
        None => std::env::var("DINORELAY_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

/// Cut `s` to at most [`LOG_TRUNCATE_BYTES`] (on a char boundary) for logging.
pub fn truncate_for_log(s: &str) -> Cow<'_, str> {
    if s.len() <= LOG_TRUNCATE_BYTES {
        return Cow::Borrowed(s);
    }
    let mut end = LOG_TRUNCATE_BYTES;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}... [truncated]", &s[..end]))
}
