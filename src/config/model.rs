// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::LogLevel;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// dir = "/srv/isle/Saved/Databases/Survival/Players"
/// recursive = false
/// poll_interval = "2s"
/// settle_delay = "100ms"
///
/// [endpoint]
/// url = "https://example.org/api/get-event"
/// timeout = "30s"
///
/// [delivery]
/// max_attempts = 3
/// retry_delay = "2s"
///
/// [log]
/// file = "/var/log/dinorelay.log"
/// ```
///
/// Only `watch.dir` and `endpoint.url` are required; they may also come from
/// the command line.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: RawWatchSection,

    #[serde(default)]
    pub endpoint: RawEndpointSection,

    #[serde(default)]
    pub delivery: RawDeliverySection,

    #[serde(default)]
    pub log: LogSettings,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWatchSection {
    /// Directory holding the per-player save files.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Also watch subdirectories, including ones created later.
    #[serde(default)]
    pub recursive: bool,

    /// How often tracked files are checked for deletions the watcher missed.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Pause between a create notification and reading the new file.
    #[serde(default = "default_settle_delay")]
    pub settle_delay: String,
}

fn default_poll_interval() -> String {
    "2s".to_string()
}

fn default_settle_delay() -> String {
    "100ms".to_string()
}

impl Default for RawWatchSection {
    fn default() -> Self {
        Self {
            dir: None,
            recursive: false,
            poll_interval: default_poll_interval(),
            settle_delay: default_settle_delay(),
        }
    }
}

/// `[endpoint]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEndpointSection {
    #[serde(default)]
    pub url: Option<String>,

    /// Per-attempt request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Value of the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Substrings that mark a response body as an HTML login page.
    /// If `None`, the built-in markers are used.
    #[serde(default)]
    pub auth_wall_markers: Option<Vec<String>>,
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl Default for RawEndpointSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            auth_wall_markers: None,
        }
    }
}

/// `[delivery]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDeliverySection {
    /// Total attempts per event, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    /// Value of the `type` field on every event.
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> String {
    "2s".to_string()
}

fn default_category() -> String {
    "player".to_string()
}

impl Default for RawDeliverySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            category: default_category(),
        }
    }
}

/// `[log]` section. Needs no validation, so it is shared by the raw and
/// validated forms.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// Append log lines to this file in addition to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Validated configuration. Built from [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSettings,
    pub endpoint: EndpointSettings,
    pub delivery: DeliverySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub dir: PathBuf,
    pub recursive: bool,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub auth_wall_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub category: String,
}
