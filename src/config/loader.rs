// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub url: Option<String>,
}

impl Overrides {
    pub fn apply(&self, raw: &mut RawConfigFile) {
        if let Some(ref dir) = self.dir {
            raw.watch.dir = Some(dir.clone());
        }
        if let Some(ref url) = self.url {
            raw.endpoint.url = Some(url.clone());
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, apply overrides and validate.
///
/// A missing file is only acceptable when overrides supply everything
/// required; in that case all other settings take their defaults.
pub fn load_and_validate(path: impl AsRef<Path>, overrides: &Overrides) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = if path.exists() || overrides.dir.is_none() || overrides.url.is_none() {
        load_from_path(path)?
    } else {
        RawConfigFile::default()
    };
    overrides.apply(&mut raw);
    ConfigFile::try_from(raw)
}
