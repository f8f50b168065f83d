// src/lib.rs

pub mod check;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod launcher;
pub mod logging;
pub mod monitor;
pub mod report;
pub mod supervisor;
pub mod toolchain;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::check::check_dependencies;
use crate::cli::CliArgs;
use crate::config::load_for_cli;
use crate::context::LaunchContext;
use crate::exec::RealProcessBackend;
use crate::fs::RealFileSystem;
use crate::launcher::launch;

/// High-level entry point used by `main.rs`.
///
/// Loads the configuration, wires the real process backend and filesystem
/// into a [`LaunchContext`], and runs either the dependency check alone
/// (`--check-only`) or the full launch with Ctrl-C as the shutdown signal.
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = load_for_cli(args.config.as_deref())?;
    info!(
        backend_dir = %config.backend.dir.display(),
        frontend_dir = %config.frontend.dir.display(),
        "configuration loaded"
    );

    let backend = RealProcessBackend::new(config.output_tail_lines);
    let ctx = LaunchContext::new(config, backend, Arc::new(RealFileSystem));

    if args.check_only {
        let passed = check_dependencies(&ctx).await;
        return Ok(if passed { 0 } else { 1 });
    }

    let outcome = launch(&ctx, interrupted()).await;
    info!(phase = ?outcome.phase, "launcher finished");
    Ok(outcome.exit_code())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves,
/// so only a server exit can end monitoring.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
