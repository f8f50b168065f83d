// src/monitor.rs

//! Monitor loop.
//!
//! Polls both servers at a fixed interval until one of them exits or the
//! shutdown future resolves (Ctrl-C in production).
//!
//! - A server exiting on its own ends the loop with an error. The other
//!   server is left alone; only the interrupt path stops both.
//! - On interrupt each live server is terminated and waited for, one after
//!   the other, and reported exactly once.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::exec::{ChildProcess, ExitInfo};
use crate::report::Console;
use crate::supervisor::ServiceHandle;
use crate::types::Service;

/// One server's shutdown result on the interrupt path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    pub service: Service,
    /// `None` if termination or the wait failed.
    pub status: Option<ExitInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Shutdown was requested and the live servers were stopped.
    Interrupted { stopped: Vec<StopReport> },
    /// A server exited without being asked to.
    ProcessExited { service: Service, status: ExitInfo },
}

/// Block until a server exits or `shutdown` resolves.
///
/// Either handle may be absent; an absent handle is neither polled nor
/// reported.
pub async fn monitor_processes<C, S>(
    console: &Console,
    mut backend: Option<&mut ServiceHandle<C>>,
    mut frontend: Option<&mut ServiceHandle<C>>,
    poll_interval: Duration,
    shutdown: S,
) -> MonitorOutcome
where
    C: ChildProcess,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(poll_ms = poll_interval.as_millis() as u64, "monitoring servers");

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                return shut_down(console, backend.as_deref_mut(), frontend.as_deref_mut()).await;
            }

            _ = ticker.tick() => {
                let handles = [backend.as_deref_mut(), frontend.as_deref_mut()];
                for handle in handles.into_iter().flatten() {
                    if let Some(status) = poll_handle(handle) {
                        let service = handle.service();
                        error!(%service, %status, "server stopped unexpectedly");
                        console.error(&format!(
                            "{} process stopped unexpectedly ({status})",
                            service.label()
                        ));
                        return MonitorOutcome::ProcessExited { service, status };
                    }
                }
            }
        }
    }
}

fn poll_handle<C: ChildProcess>(handle: &mut ServiceHandle<C>) -> Option<ExitInfo> {
    match handle.poll() {
        Ok(status) => status,
        Err(err) => {
            warn!(service = %handle.service(), error = %err, "liveness poll failed");
            None
        }
    }
}

async fn shut_down<C: ChildProcess>(
    console: &Console,
    backend: Option<&mut ServiceHandle<C>>,
    frontend: Option<&mut ServiceHandle<C>>,
) -> MonitorOutcome {
    info!("shutdown requested; stopping servers");
    console.blank();
    console.step("Shutting down servers...");

    let mut stopped = Vec::new();
    for handle in [backend, frontend].into_iter().flatten() {
        let service = handle.service();
        let status = match handle.stop().await {
            Ok(status) => {
                info!(%service, %status, "server stopped");
                console.ok(&format!("{} server stopped", service.label()));
                Some(status)
            }
            Err(err) => {
                warn!(%service, error = %err, "failed to stop server");
                console.error(&format!("Failed to stop {service}: {err}"));
                None
            }
        };
        stopped.push(StopReport { service, status });
    }

    MonitorOutcome::Interrupted { stopped }
}
