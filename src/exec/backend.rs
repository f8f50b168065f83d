// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The checker and supervisor talk to a `ProcessBackend` instead of
//! `tokio::process` directly. Tests provide their own implementation that
//! scripts version answers and child lifetimes without spawning anything.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;

use super::child::RealChild;
use super::command::{CapturedOutput, CommandOutput, CommandSpec, ExitInfo};

/// Boxed future returned by the backend traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How the launcher runs external programs.
pub trait ProcessBackend: Send + Sync {
    type Child: ChildProcess;

    /// Run a command to completion and collect its output.
    ///
    /// Errors mean the command could not be run at all (e.g. not found); a
    /// non-zero exit is reported through [`CommandOutput::status`].
    fn output<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<CommandOutput>>;

    /// Start a long-lived process with stdout/stderr captured.
    fn spawn(&self, spec: &CommandSpec) -> Result<Self::Child>;
}

/// A running child process.
pub trait ChildProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness poll: `Some` once the process has exited.
    fn try_status(&mut self) -> Result<Option<ExitInfo>>;

    /// Ask the process to stop (SIGTERM on Unix, kill elsewhere).
    fn terminate(&mut self) -> Result<()>;

    /// Wait for the process to exit. No timeout.
    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>>;

    /// Whatever stdout/stderr has been captured so far.
    fn captured_output(&mut self) -> BoxFuture<'_, CapturedOutput>;
}

/// Query `<program> --version`.
///
/// Returns the trimmed version text (stdout, or stderr for tools that print
/// it there) when the program ran and exited successfully, `None` otherwise.
pub async fn query_version<B: ProcessBackend + ?Sized>(
    backend: &B,
    program: &Path,
) -> Option<String> {
    let spec = CommandSpec::new(program).arg("--version");

    match backend.output(&spec).await {
        Ok(out) if out.success() => {
            let text = if out.stdout.trim().is_empty() {
                out.stderr.trim()
            } else {
                out.stdout.trim()
            };
            Some(text.to_string())
        }
        Ok(out) => {
            debug!(
                program = %program.display(),
                status = %out.status,
                "version query exited unsuccessfully"
            );
            None
        }
        Err(err) => {
            debug!(
                program = %program.display(),
                error = %err,
                "version query could not run"
            );
            None
        }
    }
}

/// Production backend built on `tokio::process`.
#[derive(Debug, Clone)]
pub struct RealProcessBackend {
    tail_lines: usize,
}

impl RealProcessBackend {
    /// `tail_lines` bounds how much output is kept per stream of each
    /// spawned server.
    pub fn new(tail_lines: usize) -> Self {
        Self { tail_lines }
    }
}

impl ProcessBackend for RealProcessBackend {
    type Child = RealChild;

    fn output<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            debug!(command = %spec, "running command");

            let out = spec
                .to_command()
                .output()
                .await
                .with_context(|| format!("running `{spec}`"))?;

            let output = CommandOutput {
                status: out.status.into(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            };

            debug!(command = %spec, status = %output.status, "command finished");
            Ok(output)
        })
    }

    fn spawn(&self, spec: &CommandSpec) -> Result<RealChild> {
        RealChild::spawn(spec, self.tail_lines)
    }
}
