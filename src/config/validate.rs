// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    ConfigFile, DeliverySettings, EndpointSettings, RawConfigFile, WatchSettings,
};
use crate::delivery::classify::DEFAULT_AUTH_WALL_MARKERS;
use crate::errors::{RelayError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RelayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let watch = validate_watch(&raw)?;
        let endpoint = validate_endpoint(&raw)?;
        let delivery = validate_delivery(&raw)?;
        Ok(ConfigFile {
            watch,
            endpoint,
            delivery,
            log: raw.log,
        })
    }
}

fn validate_watch(cfg: &RawConfigFile) -> Result<WatchSettings> {
    let dir = cfg.watch.dir.clone().ok_or_else(|| {
        RelayError::ConfigError(
            "[watch].dir is required (or pass --dir)".to_string(),
        )
    })?;
    if dir.as_os_str().is_empty() {
        return Err(RelayError::ConfigError(
            "[watch].dir must not be empty".to_string(),
        ));
    }

    let poll_interval = duration_field("[watch].poll_interval", &cfg.watch.poll_interval)?;
    if poll_interval.is_zero() {
        return Err(RelayError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(WatchSettings {
        dir,
        recursive: cfg.watch.recursive,
        poll_interval,
        settle_delay: duration_field("[watch].settle_delay", &cfg.watch.settle_delay)?,
    })
}

fn validate_endpoint(cfg: &RawConfigFile) -> Result<EndpointSettings> {
    let url = cfg.endpoint.url.as_deref().map(str::trim).unwrap_or("");
    if url.is_empty() {
        return Err(RelayError::ConfigError(
            "[endpoint].url is required (or pass --url)".to_string(),
        ));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(RelayError::ConfigError(format!(
            "[endpoint].url must start with http:// or https:// (got '{}')",
            url
        )));
    }

    let timeout = duration_field("[endpoint].timeout", &cfg.endpoint.timeout)?;
    if timeout.is_zero() {
        return Err(RelayError::ConfigError(
            "[endpoint].timeout must be greater than zero".to_string(),
        ));
    }

    let auth_wall_markers = match cfg.endpoint.auth_wall_markers {
        Some(ref markers) => {
            if markers.iter().any(|m| m.is_empty()) {
                return Err(RelayError::ConfigError(
                    "[endpoint].auth_wall_markers must not contain empty strings".to_string(),
                ));
            }
            markers.clone()
        }
        None => DEFAULT_AUTH_WALL_MARKERS
            .iter()
            .map(|m| m.to_string())
            .collect(),
    };

    Ok(EndpointSettings {
        url: url.to_string(),
        timeout,
        user_agent: cfg.endpoint.user_agent.clone(),
        auth_wall_markers,
    })
}

fn validate_delivery(cfg: &RawConfigFile) -> Result<DeliverySettings> {
    if cfg.delivery.max_attempts == 0 {
        return Err(RelayError::ConfigError(
            "[delivery].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.delivery.category.trim().is_empty() {
        return Err(RelayError::ConfigError(
            "[delivery].category must not be empty".to_string(),
        ));
    }

    Ok(DeliverySettings {
        max_attempts: cfg.delivery.max_attempts,
        retry_delay: duration_field("[delivery].retry_delay", &cfg.delivery.retry_delay)?,
        category: cfg.delivery.category.clone(),
    })
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| RelayError::ConfigError(format!("{field}: {e}")))
}

/// Parse durations like `100ms`, `2s`, `5m`, `1h`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60, s),
        "h" => scaled_secs(value, 60 * 60, s),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(
    value: u64,
    factor: u64,
    original: &str,
) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", original))
}
