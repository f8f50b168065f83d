// src/errors.rs

//! Crate-wide error type.
//!
//! The variants follow the failure classes of a launch: structural
//! prerequisites that cannot be fixed automatically, remediation attempts
//! that failed, toolchain problems, and processes that could not be started
//! or died during their grace period.

use thiserror::Error;

use crate::exec::ExitInfo;
use crate::types::Service;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Host runtime or package manager missing / too old.
    #[error("Toolchain error: {0}")]
    Toolchain(String),

    /// A directory or file the launcher cannot create on its own.
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// An automatic fix (venv creation, dependency install) failed.
    #[error("Remediation failed: {0}")]
    RemediationFailed(String),

    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{service} exited during its grace period ({status})")]
    ExitedDuringGrace { service: Service, status: ExitInfo },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
