#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use devlaunch::config::validate::validate_for_os;
use devlaunch::config::{LauncherConfig, RawConfigFile};
use devlaunch::context::LaunchContext;
use devlaunch::fs::mock::MockFileSystem;
use devlaunch::report::Console;
use devlaunch::toolchain::VenvLayout;
use devlaunch::types::OsFamily;

use crate::fake_backend::{FakeProcessBackend, FakeResponse, FakeServer};

/// Root of the fake project tree used across tests.
pub const PROJECT_ROOT: &str = "/proj";

/// Unix-flavoured config rooted at `root`:
/// `root/backend` and `root/frontend`, single runtime candidate `python3`.
pub fn test_config(root: &Path) -> LauncherConfig {
    let mut raw = RawConfigFile::default();
    raw.backend.dir = root.join("backend");
    raw.frontend.dir = root.join("frontend");
    raw.toolchain.runtime_candidates = Some(vec!["python3".to_string()]);
    validate_for_os(raw, OsFamily::Unix).expect("test config must validate")
}

/// Builder for a `MockFileSystem` laid out like a project checkout.
///
/// Starts out complete; the `without_*` methods knock pieces out.
pub struct LayoutBuilder {
    config: LauncherConfig,
    backend_dir: bool,
    venv: bool,
    manifest: bool,
    entry_point: bool,
    dependency_cache: bool,
}

impl LayoutBuilder {
    pub fn complete(config: &LauncherConfig) -> Self {
        Self {
            config: config.clone(),
            backend_dir: true,
            venv: true,
            manifest: true,
            entry_point: true,
            dependency_cache: true,
        }
    }

    pub fn without_backend_dir(mut self) -> Self {
        self.backend_dir = false;
        self.venv = false;
        self.manifest = false;
        self.entry_point = false;
        self
    }

    pub fn without_venv(mut self) -> Self {
        self.venv = false;
        self
    }

    pub fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    pub fn without_entry_point(mut self) -> Self {
        self.entry_point = false;
        self
    }

    pub fn without_dependency_cache(mut self) -> Self {
        self.dependency_cache = false;
        self
    }

    pub fn build(&self) -> MockFileSystem {
        let fs = MockFileSystem::new();
        let backend = &self.config.backend;
        let frontend = &self.config.frontend;

        fs.add_dir(&frontend.dir);
        if self.backend_dir {
            fs.add_dir(&backend.dir);
        }
        if self.venv {
            fs.add_file(venv_python(&self.config));
            fs.add_file(VenvLayout::for_os(self.config.os, &backend.venv_dir).pip);
        }
        if self.manifest {
            fs.add_file(&backend.manifest);
        }
        if self.entry_point {
            fs.add_file(backend.dir.join(&backend.entry_point));
        }
        if self.dependency_cache {
            fs.add_dir(&frontend.dependency_cache);
        }
        fs
    }
}

pub fn venv_python(config: &LauncherConfig) -> PathBuf {
    VenvLayout::for_os(config.os, &config.backend.venv_dir).python
}

pub fn venv_pip(config: &LauncherConfig) -> PathBuf {
    VenvLayout::for_os(config.os, &config.backend.venv_dir).pip
}

/// `import <sentinel>` arguments as the checker passes them.
pub fn sentinel_args(config: &LauncherConfig) -> [String; 2] {
    [
        "-c".to_string(),
        format!("import {}", config.backend.sentinel_module),
    ]
}

/// Script a toolchain where everything is present and answers:
/// Python 3.11.4, npm 10.2.4, sentinel importable, both servers stay up.
pub fn healthy_toolchain(backend: &FakeProcessBackend, config: &LauncherConfig) {
    backend.respond(
        "python3",
        &["--version"],
        FakeResponse::Success("Python 3.11.4\n".to_string()),
    );
    backend.respond(
        "npm",
        &["--version"],
        FakeResponse::Success("10.2.4\n".to_string()),
    );

    let [c, import] = sentinel_args(config);
    backend.respond(
        venv_python(config),
        &[c.as_str(), import.as_str()],
        FakeResponse::Success(String::new()),
    );

    backend.server(venv_python(config), FakeServer::StaysUp);
    backend.server("npm", FakeServer::StaysUp);
}

/// Context over the fakes with a silent console and no `PATH`.
pub fn fake_context(
    config: LauncherConfig,
    backend: FakeProcessBackend,
    fs: MockFileSystem,
) -> LaunchContext<FakeProcessBackend> {
    LaunchContext::new(config, backend, Arc::new(fs))
        .with_console(Console::silent())
        .with_path_var(None)
}
