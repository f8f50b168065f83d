// src/supervisor.rs

//! Process supervisor: start one server, give it a grace period, and keep
//! it only if it is still alive afterwards.
//!
//! "Alive after the grace period" is a liveness check, not a readiness
//! check. The announced endpoints are never probed.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::context::LaunchContext;
use crate::errors::{LauncherError, Result};
use crate::exec::{CapturedOutput, ChildProcess, CommandSpec, ExitInfo, ProcessBackend};
use crate::toolchain::resolve_package_manager;
use crate::types::Service;

/// A started server owned by the launcher.
///
/// Once an exit has been observed the handle remembers it and never touches
/// the underlying process again.
#[derive(Debug)]
pub struct ServiceHandle<C> {
    service: Service,
    child: C,
    exited: Option<ExitInfo>,
}

impl<C: ChildProcess> ServiceHandle<C> {
    pub fn new(service: Service, child: C) -> Self {
        Self {
            service,
            child,
            exited: None,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Exit status, if an exit has been observed.
    pub fn exit_status(&self) -> Option<ExitInfo> {
        self.exited
    }

    /// Non-blocking liveness poll.
    pub fn poll(&mut self) -> Result<Option<ExitInfo>> {
        if self.exited.is_some() {
            return Ok(self.exited);
        }

        let status = self.child.try_status()?;
        if let Some(status) = status {
            info!(service = %self.service, %status, "server process exited");
            self.exited = Some(status);
        }
        Ok(status)
    }

    /// Request termination and wait for the process to go away.
    ///
    /// The wait has no timeout.
    pub async fn stop(&mut self) -> Result<ExitInfo> {
        if let Some(status) = self.exited {
            return Ok(status);
        }

        info!(service = %self.service, pid = ?self.child.id(), "terminating server");
        self.child.terminate()?;
        let status = self.child.wait().await?;
        self.exited = Some(status);
        Ok(status)
    }

    pub async fn captured_output(&mut self) -> CapturedOutput {
        self.child.captured_output().await
    }
}

/// Start the backend API server.
pub async fn start_backend<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
) -> Option<ServiceHandle<B::Child>> {
    ctx.console.step("Starting backend API server...");
    let result = try_start_backend(ctx).await;
    finish_start(ctx, Service::Backend, &ctx.config.endpoints.backend, result)
}

/// Start the frontend dev server.
pub async fn start_frontend<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
) -> Option<ServiceHandle<B::Child>> {
    ctx.console.step("Starting frontend development server...");
    let result = try_start_frontend(ctx).await;
    finish_start(
        ctx,
        Service::Frontend,
        &ctx.config.endpoints.frontend,
        result,
    )
}

/// `<venv-python> <entry_point>` in the backend directory, with the path
/// variable pointing at the backend sources.
pub fn backend_command<B: ProcessBackend>(ctx: &LaunchContext<B>) -> CommandSpec {
    let cfg = &ctx.config.backend;
    let source_dir =
        std::path::absolute(&cfg.source_dir).unwrap_or_else(|_| cfg.source_dir.clone());

    CommandSpec::new(anchored(ctx.venv_layout().python))
        .arg(&cfg.entry_point)
        .current_dir(&cfg.dir)
        .env(&cfg.path_env_var, source_dir)
}

async fn try_start_backend<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
) -> Result<ServiceHandle<B::Child>> {
    let cfg = &ctx.config.backend;
    let entry = cfg.dir.join(&cfg.entry_point);
    if !ctx.fs.is_file(&entry) {
        return Err(LauncherError::MissingPrerequisite(format!(
            "API entry point not found: {}",
            entry.display()
        )));
    }

    let spec = backend_command(ctx);
    launch_and_probe(ctx, Service::Backend, &spec, ctx.config.timing.backend_grace).await
}

async fn try_start_frontend<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
) -> Result<ServiceHandle<B::Child>> {
    let toolchain = &ctx.config.toolchain;
    let package_manager = resolve_package_manager(
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

    let frontend = &ctx.config.frontend;
    let spec = CommandSpec::new(anchored(package_manager.program))
        .args(["run", frontend.dev_task.as_str()])
        .current_dir(&frontend.dir);

    launch_and_probe(ctx, Service::Frontend, &spec, ctx.config.timing.frontend_grace).await
}

/// Anchor a relative program path with a directory part to the launcher's
/// working directory.
///
/// Children run with their own `current_dir`, and a relative program path is
/// resolved against that. Bare names are left alone for the `PATH` search.
pub fn anchored(program: PathBuf) -> PathBuf {
    if program.is_absolute() || program.components().count() < 2 {
        return program;
    }
    std::path::absolute(&program).unwrap_or(program)
}

/// Spawn, sleep through the grace period, poll once.
async fn launch_and_probe<B: ProcessBackend>(
    ctx: &LaunchContext<B>,
    service: Service,
    spec: &CommandSpec,
    grace: Duration,
) -> Result<ServiceHandle<B::Child>> {
    let child = ctx.backend.spawn(spec)?;
    let mut handle = ServiceHandle::new(service, child);

    info!(
        %service,
        pid = ?handle.pid(),
        command = %spec,
        grace_ms = grace.as_millis() as u64,
        "server spawned; waiting out grace period"
    );
    sleep(grace).await;

    match handle.poll()? {
        None => Ok(handle),
        Some(status) => {
            let output = handle.captured_output().await;
            ctx.console
                .error(&format!("{} failed to start ({status}):", service.label()));
            ctx.console.captured_output(service, &output);
            Err(LauncherError::ExitedDuringGrace { service, status })
        }
    }
}

fn finish_start<C: ChildProcess, B: ProcessBackend>(
    ctx: &LaunchContext<B>,
    service: Service,
    endpoint: &str,
    result: Result<ServiceHandle<C>>,
) -> Option<ServiceHandle<C>> {
    match result {
        Ok(handle) => {
            info!(%service, pid = ?handle.pid(), endpoint, "server is up");
            ctx.console.ok(&format!(
                "{} server started on {endpoint}",
                service.label()
            ));
            Some(handle)
        }
        Err(err) => {
            error!(%service, error = %err, "failed to start server");
            ctx.console
                .error(&format!("Failed to start {service}: {err}"));
            None
        }
    }
}
