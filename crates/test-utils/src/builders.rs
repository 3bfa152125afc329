use std::path::Path;

use dinorelay::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// Starts from defaults with a dummy directory and endpoint filled in.
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.watch.dir = Some("/saves".into());
        config.endpoint.url = Some("http://127.0.0.1:9/api/get-event".to_string());
        Self { config }
    }

    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.watch.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.config.endpoint.url = Some(url.to_string());
        self
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.config.watch.recursive = val;
        self
    }

    pub fn poll_interval(mut self, val: &str) -> Self {
        self.config.watch.poll_interval = val.to_string();
        self
    }

    pub fn max_attempts(mut self, val: u32) -> Self {
        self.config.delivery.max_attempts = val;
        self
    }

    pub fn retry_delay(mut self, val: &str) -> Self {
        self.config.delivery.retry_delay = val.to_string();
        self
    }

    pub fn auth_wall_markers(mut self, markers: &[&str]) -> Self {
        self.config.endpoint.auth_wall_markers =
            Some(markers.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
