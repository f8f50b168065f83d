// src/toolchain/venv.rs

use std::path::{Path, PathBuf};

use crate::types::OsFamily;

/// Where a virtual environment keeps its interpreter and installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    pub root: PathBuf,
    pub python: PathBuf,
    pub pip: PathBuf,
}

impl VenvLayout {
    pub fn for_os(os: OsFamily, root: &Path) -> Self {
        let (bin, python, pip) = match os {
            OsFamily::Windows => ("Scripts", "python.exe", "pip.exe"),
            OsFamily::Unix => ("bin", "python", "pip"),
        };
        let bin = root.join(bin);

        Self {
            root: root.to_path_buf(),
            python: bin.join(python),
            pip: bin.join(pip),
        }
    }
}
