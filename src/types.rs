// src/types.rs

use std::fmt;

/// Operating-system family, as far as path conventions are concerned.
///
/// Only two layouts matter to the launcher: Windows (`Scripts\python.exe`,
/// `npm.cmd` under Program Files) and everything else (`bin/python`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Unix,
}

impl OsFamily {
    /// The family of the host we are running on.
    pub fn current() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        }
    }
}

/// The two child servers the launcher owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    Backend,
    Frontend,
}

impl Service {
    /// Capitalised name for operator-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Service::Backend => "Backend",
            Service::Frontend => "Frontend",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Backend => f.write_str("backend"),
            Service::Frontend => f.write_str("frontend"),
        }
    }
}

/// Lifecycle of one launcher run.
///
/// ```text
/// NotStarted -> BackendStarting -> FrontendStarting -> Monitoring -> ShuttingDown -> Stopped
///      \               \                  \                \
///       +---------------+------------------+----------------+--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    NotStarted,
    BackendStarting,
    /// Backend is up, frontend is being started.
    FrontendStarting,
    /// Both servers are up and being polled.
    Monitoring,
    ShuttingDown,
    Stopped,
    Failed,
}

impl LaunchPhase {
    /// Return the next phase if `self -> next` is a legal transition.
    pub fn transition(self, next: LaunchPhase) -> Option<LaunchPhase> {
        use LaunchPhase::*;

        let legal = matches!(
            (self, next),
            (NotStarted, BackendStarting)
                | (NotStarted, Failed)
                | (BackendStarting, FrontendStarting)
                | (BackendStarting, Failed)
                | (FrontendStarting, Monitoring)
                | (FrontendStarting, Failed)
                | (Monitoring, ShuttingDown)
                | (Monitoring, Failed)
                | (ShuttingDown, Stopped)
        );

        legal.then_some(next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchPhase::Stopped | LaunchPhase::Failed)
    }
}
