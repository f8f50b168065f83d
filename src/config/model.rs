// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::toolchain::RuntimeVersion;
use crate::types::OsFamily;

/// Top-level configuration as read from a TOML file.
///
/// Every section and key is optional; an empty file (or no file at all)
/// yields the stock layout:
///
/// ```toml
/// [project]
/// name = "Work Certificate Processor"
/// tagline = "Academic Credit Evaluation System"
///
/// [backend]
/// dir = "../backend"
/// venv_dir = "venv"
/// manifest = "requirements.txt"
/// entry_point = "src/api.py"
/// source_dir = "src"
/// path_env_var = "PYTHONPATH"
/// sentinel_module = "google.generativeai"
///
/// [frontend]
/// dir = "."
/// dependency_cache = "node_modules"
/// dev_task = "dev"
///
/// [toolchain]
/// min_runtime_version = "3.8"
/// package_manager = "npm"
///
/// [timing]
/// backend_grace = "3s"
/// frontend_grace = "5s"
/// poll_interval = "1s"
///
/// [endpoints]
/// backend = "http://localhost:8000"
/// docs = "http://localhost:8000/docs"
/// frontend = "http://localhost:5173"
///
/// [behaviour]
/// stop_survivor_on_exit = false
/// output_tail_lines = 200
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub frontend: FrontendSection,

    #[serde(default)]
    pub toolchain: ToolchainSection,

    #[serde(default)]
    pub timing: TimingSection,

    #[serde(default)]
    pub endpoints: EndpointsSection,

    #[serde(default)]
    pub behaviour: BehaviourSection,
}

/// `[project]` section; only used for the startup banner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub name: String,
    pub tagline: Option<String>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "Work Certificate Processor".to_string(),
            tagline: Some("Academic Credit Evaluation System".to_string()),
        }
    }
}

/// `[backend]` section.
///
/// All paths except `dir` are relative to `dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub dir: PathBuf,
    pub venv_dir: PathBuf,
    pub manifest: PathBuf,
    /// Server script, passed to the venv interpreter as-is (cwd = `dir`).
    pub entry_point: PathBuf,
    /// Directory exported through `path_env_var`.
    pub source_dir: PathBuf,
    pub path_env_var: String,
    /// Module whose import proves the manifest has been installed.
    pub sentinel_module: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("../backend"),
            venv_dir: PathBuf::from("venv"),
            manifest: PathBuf::from("requirements.txt"),
            entry_point: PathBuf::from("src/api.py"),
            source_dir: PathBuf::from("src"),
            path_env_var: "PYTHONPATH".to_string(),
            sentinel_module: "google.generativeai".to_string(),
        }
    }
}

/// `[frontend]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontendSection {
    pub dir: PathBuf,
    /// Relative to `dir`.
    pub dependency_cache: PathBuf,
    /// Package-manager script started with `<pm> run <dev_task>`.
    pub dev_task: String,
}

impl Default for FrontendSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            dependency_cache: PathBuf::from("node_modules"),
            dev_task: "dev".to_string(),
        }
    }
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainSection {
    /// Host interpreters to try, in order. `None` means the per-OS default.
    pub runtime_candidates: Option<Vec<String>>,
    pub min_runtime_version: String,
    pub package_manager: String,
    /// Extra locations tried after `PATH` and the built-in fallbacks.
    pub package_manager_fallbacks: Vec<PathBuf>,
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            runtime_candidates: None,
            min_runtime_version: "3.8".to_string(),
            package_manager: "npm".to_string(),
            package_manager_fallbacks: Vec::new(),
        }
    }
}

/// `[timing]` section; durations as `"3s"`, `"500ms"`, ...
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    pub backend_grace: String,
    pub frontend_grace: String,
    pub poll_interval: String,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            backend_grace: "3s".to_string(),
            frontend_grace: "5s".to_string(),
            poll_interval: "1s".to_string(),
        }
    }
}

/// `[endpoints]` section. Announced in status output, never probed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsSection {
    pub backend: String,
    pub docs: String,
    pub frontend: String,
}

impl Default for EndpointsSection {
    fn default() -> Self {
        Self {
            backend: "http://localhost:8000".to_string(),
            docs: "http://localhost:8000/docs".to_string(),
            frontend: "http://localhost:5173".to_string(),
        }
    }
}

/// `[behaviour]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BehaviourSection {
    /// When one server dies on its own, also stop the other one.
    ///
    /// Off by default: the monitor only tears both down on Ctrl-C.
    pub stop_survivor_on_exit: bool,
    /// Lines of stdout/stderr kept per child for failure reports.
    pub output_tail_lines: usize,
}

impl Default for BehaviourSection {
    fn default() -> Self {
        Self {
            stop_survivor_on_exit: false,
            output_tail_lines: 200,
        }
    }
}

/// Validated configuration handed to the launcher.
///
/// Paths are already joined onto their base directories, durations parsed
/// and per-OS defaults resolved. Build it through
/// `LauncherConfig::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub os: OsFamily,
    pub project: ProjectSection,
    pub backend: BackendConfig,
    pub frontend: FrontendConfig,
    pub toolchain: ToolchainConfig,
    pub timing: TimingConfig,
    pub endpoints: Endpoints,
    pub stop_survivor_on_exit: bool,
    pub output_tail_lines: usize,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub dir: PathBuf,
    /// `dir/venv_dir`.
    pub venv_dir: PathBuf,
    /// `dir/manifest`.
    pub manifest: PathBuf,
    /// Relative to `dir`; also the argument passed to the interpreter.
    pub entry_point: PathBuf,
    /// `dir/source_dir`.
    pub source_dir: PathBuf,
    pub path_env_var: String,
    pub sentinel_module: String,
}

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub dir: PathBuf,
    /// `dir/dependency_cache`.
    pub dependency_cache: PathBuf,
    pub dev_task: String,
}

#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub runtime_candidates: Vec<String>,
    pub min_runtime_version: RuntimeVersion,
    pub package_manager: String,
    pub package_manager_fallbacks: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
pub struct TimingConfig {
    pub backend_grace: Duration,
    pub frontend_grace: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub backend: String,
    pub docs: String,
    pub frontend: String,
}
