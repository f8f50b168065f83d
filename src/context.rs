// src/context.rs

use std::ffi::OsString;
use std::sync::Arc;

use crate::config::LauncherConfig;
use crate::exec::ProcessBackend;
use crate::fs::FileSystem;
use crate::report::Console;
use crate::toolchain::VenvLayout;

/// Everything one launcher run needs, passed explicitly instead of read
/// from ambient state.
pub struct LaunchContext<B> {
    pub config: LauncherConfig,
    pub backend: B,
    pub fs: Arc<dyn FileSystem>,
    pub console: Console,
    /// Value of `PATH` used for executable lookup.
    pub path_var: Option<OsString>,
}

impl<B: ProcessBackend> LaunchContext<B> {
    /// Context with stdout reporting and the process's own `PATH`.
    pub fn new(config: LauncherConfig, backend: B, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            backend,
            fs,
            console: Console::stdout(),
            path_var: std::env::var_os("PATH"),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn with_path_var(mut self, path_var: Option<OsString>) -> Self {
        self.path_var = path_var;
        self
    }

    /// Interpreter/installer locations inside the backend venv.
    pub fn venv_layout(&self) -> VenvLayout {
        VenvLayout::for_os(self.config.os, &self.config.backend.venv_dir)
    }
}
