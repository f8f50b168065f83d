// src/check.rs

//! Dependency checker.
//!
//! Runs once, in order, and stops at the first failure:
//!
//! 1. host interpreter answers `--version` and meets the minimum
//! 2. package manager answers `--version`
//! 3. backend directory exists
//! 4. backend venv exists (created if missing)
//! 5. dependency manifest exists
//! 6. venv interpreter exists at the platform path
//! 7. sentinel module imports (manifest installed if not)
//! 8. frontend dependency cache exists
//!
//! Steps 4 and 7 are the only ones allowed to change anything, and each
//! remediation is tried at most once.

use tracing::{error, info, warn};

use crate::context::LaunchContext;
use crate::errors::{LauncherError, Result};
use crate::exec::{CommandSpec, ProcessBackend};
use crate::toolchain::{
    ResolvedTool, RuntimeVersion, VenvLayout, resolve_package_manager, resolve_runtime,
};

/// What a successful check found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub runtime: ResolvedTool,
    pub runtime_version: RuntimeVersion,
    pub package_manager: ResolvedTool,
    /// The venv was missing and has been created.
    pub venv_created: bool,
    /// The sentinel import failed and the manifest has been installed.
    pub packages_installed: bool,
}

/// Run every check and report pass/fail.
///
/// Errors are logged and shown to the operator, never returned.
pub async fn check_dependencies<B: ProcessBackend>(ctx: &LaunchContext<B>) -> bool {
    ctx.console.step("Checking dependencies...");

    match run_checks(ctx).await {
        Ok(report) => {
            info!(
                runtime = %report.runtime.program.display(),
                runtime_version = %report.runtime_version,
                package_manager = %report.package_manager.program.display(),
                venv_created = report.venv_created,
                packages_installed = report.packages_installed,
                "dependency check passed"
            );
            ctx.console.ok("Dependencies check passed");
            true
        }
        Err(err) => {
            error!(error = %err, "dependency check failed");
            ctx.console.error(&err.to_string());
            false
        }
    }
}

/// The check itself, with the failure reason kept.
pub async fn run_checks<B: ProcessBackend>(ctx: &LaunchContext<B>) -> Result<CheckReport> {
    let (runtime, runtime_version) = check_runtime(ctx).await?;
    let package_manager = check_package_manager(ctx).await?;

    check_backend_dir(ctx)?;
    let venv_created = ensure_venv(ctx, &runtime).await?;
    check_manifest(ctx)?;
    let layout = check_venv_interpreter(ctx)?;
    let packages_installed = ensure_packages(ctx, &layout).await?;
    check_dependency_cache(ctx, &package_manager)?;

    Ok(CheckReport {
        runtime,
        runtime_version,
        package_manager,
        venv_created,
        packages_installed,
    })
}

async fn check_runtime<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
) -> Result<(ResolvedTool, RuntimeVersion)> {
    let toolchain = &ctx.config.toolchain;
    let minimum = toolchain.min_runtime_version;

    let runtime = resolve_runtime(&ctx.backend, toolchain).await.ok_or_else(|| {
        LauncherError::Toolchain(format!(
            "Python {minimum}+ required but no interpreter answered (tried {})",
            toolchain.runtime_candidates.join(", ")
        ))
    })?;

    let version = RuntimeVersion::from_banner(&runtime.version).ok_or_else(|| {
        LauncherError::Toolchain(format!(
            "could not read a version from `{} --version` (got '{}')",
            runtime.program.display(),
            runtime.version
        ))
    })?;

    if !version.satisfies(&minimum) {
        return Err(LauncherError::Toolchain(format!(
            "Python {minimum}+ required, found {version} ({})",
            runtime.program.display()
        )));
    }

    ctx.console
        .ok(&format!("Python found: {version} ({})", runtime.program.display()));
    Ok((runtime, version))
}

async fn check_package_manager<B: ProcessBackend>(ctx: &LaunchContext<B>) -> Result<ResolvedTool> {
    let toolchain = &ctx.config.toolchain;

    let tool = resolve_package_manager(
        &ctx.backend,
        ctx.fs.as_ref(),
        ctx.config.os,
        ctx.path_var.as_deref(),
        toolchain,
    )
    .await
    .ok_or_else(|| {
        LauncherError::Toolchain(format!(
            "{} not found; install Node.js from https://nodejs.org/",
            toolchain.package_manager
        ))
    })?;

    ctx.console.ok(&format!(
        "{} found: {}",
        toolchain.package_manager, tool.version
    ));
    Ok(tool)
}

fn check_backend_dir<B: ProcessBackend>(ctx: &LaunchContext<B>) -> Result<()> {
    let dir = &ctx.config.backend.dir;
    if !ctx.fs.is_dir(dir) {
        return Err(LauncherError::MissingPrerequisite(format!(
            "backend directory not found: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// Create the venv with the host interpreter if it is missing.
async fn ensure_venv<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
    runtime: &ResolvedTool,
) -> Result<bool> {
    let venv_dir = &ctx.config.backend.venv_dir;
    if ctx.fs.is_dir(venv_dir) {
        return Ok(false);
    }

    warn!(venv = %venv_dir.display(), "backend virtual environment missing; creating it");
    ctx.console
        .warn("Backend virtual environment not found. Creating one...");

    let spec = CommandSpec::new(&runtime.program)
        .args(["-m", "venv"])
        .arg(venv_dir)
        .inherit_output();

    match ctx.backend.output(&spec).await {
        Ok(out) if out.success() => {
            ctx.console.ok("Virtual environment created");
            Ok(true)
        }
        Ok(out) => Err(LauncherError::RemediationFailed(format!(
            "failed to create virtual environment at {} ({})",
            venv_dir.display(),
            out.status
        ))),
        Err(err) => Err(LauncherError::RemediationFailed(format!(
            "failed to create virtual environment at {}: {err}",
            venv_dir.display()
        ))),
    }
}

fn check_manifest<B: ProcessBackend>(ctx: &LaunchContext<B>) -> Result<()> {
    let manifest = &ctx.config.backend.manifest;
    if !ctx.fs.is_file(manifest) {
        return Err(LauncherError::MissingPrerequisite(format!(
            "backend dependency manifest not found: {}",
            manifest.display()
        )));
    }
    Ok(())
}

fn check_venv_interpreter<B: ProcessBackend>(ctx: &LaunchContext<B>) -> Result<VenvLayout> {
    let layout = ctx.venv_layout();
    if !ctx.fs.is_file(&layout.python) {
        return Err(LauncherError::MissingPrerequisite(format!(
            "Python not found in virtual environment: {}",
            layout.python.display()
        )));
    }
    Ok(layout)
}

/// Install the manifest if the sentinel module does not import.
async fn ensure_packages<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
    layout: &VenvLayout,
) -> Result<bool> {
    let backend_cfg = &ctx.config.backend;

    let probe = CommandSpec::new(&layout.python)
        .arg("-c")
        .arg(format!("import {}", backend_cfg.sentinel_module));
    let probed = ctx.backend.output(&probe).await.map_err(|err| {
        LauncherError::RemediationFailed(format!("failed to check backend dependencies: {err}"))
    })?;

    if probed.success() {
        ctx.console.ok("Backend dependencies found");
        return Ok(false);
    }

    warn!(
        sentinel = %backend_cfg.sentinel_module,
        stderr = %probed.stderr.trim(),
        "sentinel import failed; installing backend dependencies"
    );
    ctx.console
        .warn("Backend dependencies not installed. Installing...");

    let install = CommandSpec::new(&layout.pip)
        .args(["install", "-r"])
        .arg(&backend_cfg.manifest)
        .inherit_output();

    match ctx.backend.output(&install).await {
        Ok(out) if out.success() => {
            ctx.console.ok("Backend dependencies installed");
            Ok(true)
        }
        Ok(out) => Err(LauncherError::RemediationFailed(format!(
            "failed to install backend dependencies ({})",
            out.status
        ))),
        Err(err) => Err(LauncherError::RemediationFailed(format!(
            "failed to install backend dependencies: {err}"
        ))),
    }
}

fn check_dependency_cache<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
    package_manager: &ResolvedTool,
) -> Result<()> {
    let frontend = &ctx.config.frontend;
    if !ctx.fs.is_dir(&frontend.dependency_cache) {
        return Err(LauncherError::MissingPrerequisite(format!(
            "frontend dependencies not installed ({} missing); run '{} install' in {}",
            frontend.dependency_cache.display(),
            package_manager.program.display(),
            frontend.dir.display()
        )));
    }
    Ok(())
}
