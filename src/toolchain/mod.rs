// src/toolchain/mod.rs

//! Locating the host toolchain.
//!
//! - [`candidates`] builds ordered lookup lists (pure, given a filesystem).
//! - [`version`] parses and compares interpreter versions.
//! - [`venv`] knows where a virtual environment keeps its binaries.
//!
//! The async helpers here walk a candidate list and keep the first program
//! that answers `--version` successfully.

pub mod candidates;
pub mod venv;
pub mod version;

use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

use crate::config::ToolchainConfig;
use crate::exec::{ProcessBackend, query_version};
use crate::fs::FileSystem;
use crate::types::OsFamily;

pub use candidates::{candidate_list, default_runtime_candidates, fallback_locations};
pub use venv::VenvLayout;
pub use version::RuntimeVersion;

/// A program that answered its version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub program: PathBuf,
    /// Trimmed `--version` output.
    pub version: String,
}

/// First candidate whose `--version` succeeds.
pub async fn resolve_first<B, I>(backend: &B, candidates: I) -> Option<ResolvedTool>
where
    B: ProcessBackend + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    for program in candidates {
        if let Some(version) = query_version(backend, &program).await {
            debug!(program = %program.display(), %version, "candidate answered");
            return Some(ResolvedTool { program, version });
        }
    }
    None
}

/// Host interpreter used to create the venv.
pub async fn resolve_runtime<B>(backend: &B, toolchain: &ToolchainConfig) -> Option<ResolvedTool>
where
    B: ProcessBackend + ?Sized,
{
    resolve_first(
        backend,
        toolchain.runtime_candidates.iter().map(PathBuf::from),
    )
    .await
}

/// Package manager, searched `PATH`-first then through the fallbacks.
pub async fn resolve_package_manager<B>(
    backend: &B,
    fs: &dyn FileSystem,
    os: OsFamily,
    path_var: Option<&OsStr>,
    toolchain: &ToolchainConfig,
) -> Option<ResolvedTool>
where
    B: ProcessBackend + ?Sized,
{
    let candidates = candidate_list(
        fs,
        os,
        path_var,
        &toolchain.package_manager,
        &toolchain.package_manager_fallbacks,
    );
    debug!(?candidates, "package manager candidates");
    resolve_first(backend, candidates).await
}
