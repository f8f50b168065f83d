// src/report.rs

//! Operator-facing status output.
//!
//! Diagnostics go through `tracing` to stderr; this module prints the short,
//! human-readable progress lines on stdout. Tests use [`Console::silent`].

use std::fmt::Display;

use colored::Colorize;

use crate::config::{Endpoints, ProjectSection};
use crate::exec::CapturedOutput;
use crate::types::Service;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
}

impl Console {
    pub fn stdout() -> Self {
        Self { enabled: true }
    }

    pub fn silent() -> Self {
        Self { enabled: false }
    }

    fn emit(&self, line: impl Display) {
        if self.enabled {
            println!("{line}");
        }
    }

    pub fn blank(&self) {
        self.emit("");
    }

    pub fn banner(&self, project: &ProjectSection) {
        let rule = "=".repeat(RULE_WIDTH);
        self.emit(rule.bold());
        self.emit(format!("  {}", project.name.bold()));
        if let Some(tagline) = &project.tagline {
            self.emit(format!("  {tagline}"));
        }
        self.emit(rule.bold());
        self.blank();
    }

    /// Start of a phase, e.g. "Checking dependencies...".
    pub fn step(&self, msg: &str) {
        self.emit(format!("{} {}", "==>".cyan().bold(), msg.bold()));
    }

    pub fn ok(&self, msg: &str) {
        self.emit(format!("  {} {}", "ok".green().bold(), msg));
    }

    pub fn warn(&self, msg: &str) {
        self.emit(format!("  {} {}", "WARNING:".yellow().bold(), msg));
    }

    pub fn error(&self, msg: &str) {
        self.emit(format!("{} {}", "ERROR:".red().bold(), msg));
    }

    /// Dump what a child printed before it died.
    pub fn captured_output(&self, service: Service, output: &CapturedOutput) {
        if output.is_empty() {
            self.emit(format!("   {} produced no output", service.label()));
            return;
        }
        for (name, lines) in [("STDOUT", &output.stdout), ("STDERR", &output.stderr)] {
            self.emit(format!("   {name}:"));
            for line in lines {
                self.emit(format!("     {line}"));
            }
        }
    }

    pub fn started_summary(&self, endpoints: &Endpoints) {
        self.blank();
        self.emit("Application started successfully!".green().bold());
        self.emit(format!("   Frontend:    {}", endpoints.frontend));
        self.emit(format!("   Backend API: {}", endpoints.backend));
        self.emit(format!("   API Docs:    {}", endpoints.docs));
        self.blank();
        self.emit("Press Ctrl+C to stop all servers");
        self.blank();
    }
}
