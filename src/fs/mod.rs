// src/fs/mod.rs

use std::fmt::Debug;
use std::path::Path;

pub mod mock;

/// The filesystem questions the launcher asks.
///
/// The launcher never writes files itself (the venv is created by the
/// interpreter), so this stays read-only.
pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
