// src/launcher.rs

//! The launch sequence: banner, dependency check, backend, frontend,
//! monitor. Any failure before monitoring unwinds what was already started.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::check::check_dependencies;
use crate::context::LaunchContext;
use crate::exec::{ChildProcess, ProcessBackend};
use crate::monitor::{MonitorOutcome, monitor_processes};
use crate::supervisor::{ServiceHandle, start_backend, start_frontend};
use crate::types::{LaunchPhase, Service};

/// How a launcher run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub phase: LaunchPhase,
    /// Present once monitoring started.
    pub monitor: Option<MonitorOutcome>,
}

impl LaunchOutcome {
    /// 1 when the check or a server start failed, 0 once monitoring ran.
    ///
    /// A server exiting on its own ends monitoring with an error report, but
    /// the launcher itself finished normally.
    pub fn exit_code(&self) -> i32 {
        match (&self.phase, &self.monitor) {
            (LaunchPhase::Stopped, _) => 0,
            (_, Some(MonitorOutcome::ProcessExited { .. })) => 0,
            _ => 1,
        }
    }
}

#[derive(Debug)]
struct PhaseTracker {
    phase: LaunchPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: LaunchPhase::NotStarted,
        }
    }

    fn advance(&mut self, next: LaunchPhase) {
        match self.phase.transition(next) {
            Some(phase) => {
                debug!(from = ?self.phase, to = ?phase, "launch phase");
                self.phase = phase;
            }
            None => warn!(from = ?self.phase, to = ?next, "ignoring illegal phase transition"),
        }
    }

    fn finish(self, monitor: Option<MonitorOutcome>) -> LaunchOutcome {
        if !self.phase.is_terminal() {
            warn!(phase = ?self.phase, "launch ended outside a terminal phase");
        }
        LaunchOutcome {
            phase: self.phase,
            monitor,
        }
    }
}

/// Run the whole launch sequence.
///
/// `shutdown` resolving while monitoring is the interrupt signal; in
/// production it is Ctrl-C.
pub async fn launch<B, S>(ctx: &LaunchContext<B>, shutdown: S) -> LaunchOutcome
where
    B: ProcessBackend,
    S: Future<Output = ()>,
{
    let console = &ctx.console;
    let mut phase = PhaseTracker::new();

    console.banner(&ctx.config.project);

    if !check_dependencies(ctx).await {
        console.blank();
        console.error("Dependency check failed. Please fix the issues above.");
        phase.advance(LaunchPhase::Failed);
        return phase.finish(None);
    }
    console.blank();

    phase.advance(LaunchPhase::BackendStarting);
    let Some(mut backend) = start_backend(ctx).await else {
        console.blank();
        console.error("Failed to start backend. Please check the error messages above.");
        phase.advance(LaunchPhase::Failed);
        return phase.finish(None);
    };
    console.blank();

    phase.advance(LaunchPhase::FrontendStarting);
    let Some(mut frontend) = start_frontend(ctx).await else {
        console.blank();
        console.error("Failed to start frontend. Please check the error messages above.");
        stop_service(ctx, &mut backend).await;
        phase.advance(LaunchPhase::Failed);
        return phase.finish(None);
    };

    console.started_summary(&ctx.config.endpoints);
    phase.advance(LaunchPhase::Monitoring);

    let outcome = monitor_processes(
        console,
        Some(&mut backend),
        Some(&mut frontend),
        ctx.config.timing.poll_interval,
        shutdown,
    )
    .await;

    match &outcome {
        MonitorOutcome::Interrupted { .. } => {
            phase.advance(LaunchPhase::ShuttingDown);
            phase.advance(LaunchPhase::Stopped);
            info!("all servers stopped");
        }
        MonitorOutcome::ProcessExited { service, .. } => {
            let survivor = match service {
                Service::Backend => &mut frontend,
                Service::Frontend => &mut backend,
            };
            if ctx.config.stop_survivor_on_exit {
                stop_service(ctx, survivor).await;
            } else {
                warn!(
                    survivor = %survivor.service(),
                    pid = ?survivor.pid(),
                    "leaving surviving server running"
                );
                console.warn(&survivor_notice(survivor.service(), survivor.pid()));
            }
            phase.advance(LaunchPhase::Failed);
        }
    }

    phase.finish(Some(outcome))
}

/// Warning shown for a server left behind after the other one exited.
///
/// Its stdout/stderr are pipes read by this process, so once the launcher
/// exits the server's next write fails with a broken pipe.
fn survivor_notice(service: Service, pid: Option<u32>) -> String {
    let pid = pid.map(|pid| format!(" (pid {pid})")).unwrap_or_default();
    format!(
        "{} server{pid} was left running, but its output is no longer read; \
         it will likely fail on its next write. Stop it and restart the launcher",
        service.label()
    )
}

async fn stop_service<B, C>(ctx: &LaunchContext<B>, handle: &mut ServiceHandle<C>)
where
    B: ProcessBackend,
    C: ChildProcess,
{
    let service = handle.service();
    match handle.stop().await {
        Ok(status) => {
            info!(%service, %status, "server stopped");
            ctx.console
                .ok(&format!("{} server stopped", service.label()));
        }
        Err(err) => {
            warn!(%service, error = %err, "failed to stop server");
            ctx.console
                .error(&format!("Failed to stop {service}: {err}"));
        }
    }
}
