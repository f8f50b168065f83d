// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything the launcher does to the outside world goes through the
//! [`ProcessBackend`] trait: one-shot commands (version queries, venv
//! creation, dependency installs) and long-lived servers. Production code
//! uses [`RealProcessBackend`] on top of `tokio::process`; tests swap in a
//! fake that never spawns anything.
//!
//! - [`command`] describes what to run ([`CommandSpec`]) and what came back.
//! - [`backend`] holds the traits and the tokio implementation.
//! - [`child`] wraps a running server process and drains its output.

pub mod backend;
pub mod child;
pub mod command;

pub use backend::{BoxFuture, ChildProcess, ProcessBackend, RealProcessBackend, query_version};
pub use child::{OutputTail, RealChild};
pub use command::{CapturedOutput, CommandOutput, CommandSpec, ExitInfo};
