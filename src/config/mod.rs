// src/config/mod.rs

//! Configuration loading and validation for dinorelay.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply CLI overrides (`loader.rs`).
//! - Validate and convert into typed settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, Overrides};
pub use model::{
    ConfigFile, DeliverySettings, EndpointSettings, LogSettings, RawConfigFile,
    RawDeliverySection, RawEndpointSection, RawWatchSection, WatchSettings,
};
pub use validate::parse_duration;
