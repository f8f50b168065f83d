// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag is optional: a bare `devlaunch` runs the full check, start and
//! monitor sequence with the built-in defaults.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devlaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devlaunch",
    version,
    about = "Check the dev toolchain, then start and watch the backend and frontend servers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// If omitted, `Devlaunch.toml` in the current directory is used when it
    /// exists, otherwise the built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Run the dependency check only, then exit.
    #[arg(long)]
    pub check_only: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_is_a_valid_invocation() {
        let args = CliArgs::try_parse_from(["devlaunch"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.check_only);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "devlaunch",
            "--config",
            "dev.toml",
            "--log-level",
            "debug",
            "--check-only",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("dev.toml"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.check_only);
    }
}
