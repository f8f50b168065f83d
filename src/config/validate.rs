// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    BackendConfig, Endpoints, FrontendConfig, LauncherConfig, RawConfigFile, TimingConfig,
    ToolchainConfig,
};
use crate::errors::{LauncherError, Result};
use crate::toolchain::{RuntimeVersion, default_runtime_candidates};
use crate::types::OsFamily;

impl TryFrom<RawConfigFile> for LauncherConfig {
    type Error = LauncherError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_for_os(raw, OsFamily::current())
    }
}

/// Validate `raw` as if running on `os`.
///
/// `TryFrom` uses the host family; tests use this to pin one.
pub fn validate_for_os(raw: RawConfigFile, os: OsFamily) -> Result<LauncherConfig> {
    validate_names(&raw)?;

    let timing = TimingConfig {
        backend_grace: positive_duration("timing.backend_grace", &raw.timing.backend_grace)?,
        frontend_grace: positive_duration("timing.frontend_grace", &raw.timing.frontend_grace)?,
        poll_interval: positive_duration("timing.poll_interval", &raw.timing.poll_interval)?,
    };

    let min_runtime_version: RuntimeVersion =
        raw.toolchain.min_runtime_version.parse().map_err(|e| {
            LauncherError::ConfigError(format!("[toolchain].min_runtime_version: {e}"))
        })?;

    let runtime_candidates = match raw.toolchain.runtime_candidates {
        Some(list) if list.is_empty() => {
            return Err(LauncherError::ConfigError(
                "[toolchain].runtime_candidates must not be empty when given".to_string(),
            ));
        }
        Some(list) => list,
        None => default_runtime_candidates(os),
    };

    if raw.behaviour.output_tail_lines == 0 {
        return Err(LauncherError::ConfigError(
            "[behaviour].output_tail_lines must be >= 1 (got 0)".to_string(),
        ));
    }

    let b = raw.backend;
    let backend = BackendConfig {
        venv_dir: b.dir.join(&b.venv_dir),
        manifest: b.dir.join(&b.manifest),
        source_dir: b.dir.join(&b.source_dir),
        entry_point: b.entry_point,
        path_env_var: b.path_env_var,
        sentinel_module: b.sentinel_module,
        dir: b.dir,
    };

    let f = raw.frontend;
    let frontend = FrontendConfig {
        dependency_cache: f.dir.join(&f.dependency_cache),
        dev_task: f.dev_task,
        dir: f.dir,
    };

    Ok(LauncherConfig {
        os,
        project: raw.project,
        backend,
        frontend,
        toolchain: ToolchainConfig {
            runtime_candidates,
            min_runtime_version,
            package_manager: raw.toolchain.package_manager,
            package_manager_fallbacks: raw.toolchain.package_manager_fallbacks,
        },
        timing,
        endpoints: Endpoints {
            backend: raw.endpoints.backend,
            docs: raw.endpoints.docs,
            frontend: raw.endpoints.frontend,
        },
        stop_survivor_on_exit: raw.behaviour.stop_survivor_on_exit,
        output_tail_lines: raw.behaviour.output_tail_lines,
    })
}

fn validate_names(raw: &RawConfigFile) -> Result<()> {
    let required = [
        ("backend.path_env_var", raw.backend.path_env_var.as_str()),
        ("backend.sentinel_module", raw.backend.sentinel_module.as_str()),
        ("frontend.dev_task", raw.frontend.dev_task.as_str()),
        ("toolchain.package_manager", raw.toolchain.package_manager.as_str()),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(LauncherError::ConfigError(format!(
                "[{key}] must not be empty"
            )));
        }
    }

    if raw.backend.path_env_var.contains('=') {
        return Err(LauncherError::ConfigError(format!(
            "[backend].path_env_var '{}' is not a valid variable name",
            raw.backend.path_env_var
        )));
    }

    Ok(())
}

fn positive_duration(key: &str, value: &str) -> Result<Duration> {
    let dur = parse_duration(value)
        .map_err(|e| LauncherError::ConfigError(format!("[{key}]: {e}")))?;
    if dur.is_zero() {
        return Err(LauncherError::ConfigError(format!(
            "[{key}] must be greater than zero"
        )));
    }
    Ok(dur)
}
