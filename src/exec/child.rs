// src/exec/child.rs

//! Long-lived server process backed by `tokio::process::Child`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::errors::{LauncherError, Result};

use super::backend::{BoxFuture, ChildProcess};
use super::command::{CapturedOutput, CommandSpec, ExitInfo};

/// How long to wait for the drainers to hit EOF once the child is gone.
/// A grandchild that inherited the pipe can keep it open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Bounded ring of the most recent lines of one stream.
#[derive(Debug, Clone)]
pub struct OutputTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl OutputTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, line: String) {
        let mut lines = self.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A spawned server whose stdout/stderr are drained in the background.
///
/// Draining keeps a chatty child from blocking on a full pipe. Every line is
/// logged at debug and the last few are kept for the failure report.
#[derive(Debug)]
pub struct RealChild {
    child: Child,
    stdout: OutputTail,
    stderr: OutputTail,
    drainers: Vec<JoinHandle<()>>,
}

impl RealChild {
    pub(crate) fn spawn(spec: &CommandSpec, tail_lines: usize) -> Result<Self> {
        let mut child = spec
            .to_command()
            .spawn()
            .map_err(|e| LauncherError::SpawnFailed {
                program: spec.program.display().to_string(),
                reason: e.to_string(),
            })?;

        let label = spec
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.program.display().to_string());

        info!(command = %spec, pid = ?child.id(), "spawned process");

        let stdout = OutputTail::new(tail_lines);
        let stderr = OutputTail::new(tail_lines);
        let mut drainers = Vec::with_capacity(2);

        if let Some(out) = child.stdout.take() {
            drainers.push(spawn_drainer(out, label.clone(), "stdout", stdout.clone()));
        }
        if let Some(err) = child.stderr.take() {
            drainers.push(spawn_drainer(err, label, "stderr", stderr.clone()));
        }

        Ok(Self {
            child,
            stdout,
            stderr,
            drainers,
        })
    }
}

fn spawn_drainer<R>(
    reader: R,
    label: String,
    stream: &'static str,
    tail: OutputTail,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(process = %label, stream, "{}", line);
            tail.push(line);
        }
        debug!(process = %label, stream, "output stream closed");
    })
}

impl ChildProcess for RealChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_status(&mut self) -> Result<Option<ExitInfo>> {
        Ok(self.child.try_wait()?.map(ExitInfo::from))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<()> {
        // `id()` is None once the child has been reaped.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                return Err(err.into());
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<()> {
        self.child.start_kill()?;
        Ok(())
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(status.into())
        })
    }

    fn captured_output(&mut self) -> BoxFuture<'_, CapturedOutput> {
        Box::pin(async move {
            for handle in self.drainers.drain(..) {
                if timeout(DRAIN_GRACE, handle).await.is_err() {
                    debug!("output stream still open; reporting what was captured");
                }
            }

            CapturedOutput {
                stdout: self.stdout.snapshot(),
                stderr: self.stderr.snapshot(),
            }
        })
    }
}
