// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;
pub use crate::types::LogLevel;

/// Command-line arguments for `dinorelay`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dinorelay",
    version,
    about = "Relay per-player save file changes to an HTTP endpoint.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Dinorelay.toml` in the current working directory. May be
    /// absent if both `--dir` and `--url` are given.
    #[arg(long, value_name = "PATH", default_value = "Dinorelay.toml")]
    pub config: String,

    /// Directory of save files to watch (overrides `[watch].dir`).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Endpoint events are POSTed to (overrides `[endpoint].url`).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `[log].level`, then `DINORELAY_LOG`, then `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print it, and exit without watching.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dir: self.dir.clone(),
            url: self.url.clone(),
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
