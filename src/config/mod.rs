// src/config/mod.rs

//! Launcher configuration.
//!
//! - [`model`] holds the raw TOML shape (`RawConfigFile`) and the validated
//!   [`LauncherConfig`] the rest of the crate consumes.
//! - [`validate`] turns the former into the latter.
//! - [`loader`] reads files from disk.
//! - [`duration`] parses `"3s"` / `"250ms"` style durations.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_for_cli, load_from_path};
pub use model::{
    BackendConfig, BackendSection, BehaviourSection, Endpoints, EndpointsSection,
    FrontendConfig, FrontendSection, LauncherConfig, ProjectSection, RawConfigFile,
    TimingConfig, TimingSection, ToolchainConfig, ToolchainSection,
};
