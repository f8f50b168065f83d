// src/toolchain/candidates.rs

//! Ordered candidate lists for locating executables.
//!
//! Lookup order for a tool `name`:
//! 1. every `PATH` directory containing `name` (plus `.cmd` / `.exe` on
//!    Windows), in `PATH` order;
//! 2. the bare `name`, left for the OS to resolve;
//! 3. the built-in per-OS fallbacks, then any configured extras.
//!
//! Duplicates are dropped, first occurrence wins.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::fs::FileSystem;
use crate::types::OsFamily;

/// Default host interpreters to probe.
pub fn default_runtime_candidates(os: OsFamily) -> Vec<String> {
    match os {
        OsFamily::Windows => vec!["python".to_string(), "py".to_string()],
        OsFamily::Unix => vec!["python3".to_string(), "python".to_string()],
    }
}

/// Well-known install locations for a package manager, per OS family.
pub fn fallback_locations(os: OsFamily, name: &str) -> Vec<PathBuf> {
    match os {
        OsFamily::Windows => [r"C:\Program Files\nodejs", r"C:\Program Files (x86)\nodejs"]
            .iter()
            .map(|dir| PathBuf::from(format!(r"{dir}\{name}.cmd")))
            .collect(),
        OsFamily::Unix => Vec::new(),
    }
}

/// File names `name` may carry on disk.
fn executable_names(os: OsFamily, name: &str) -> Vec<String> {
    match os {
        OsFamily::Windows if !name.contains('.') => {
            vec![format!("{name}.cmd"), format!("{name}.exe"), name.to_string()]
        }
        _ => vec![name.to_string()],
    }
}

/// Files named like `name` in the directories of `path_var`.
pub fn search_path(
    fs: &dyn FileSystem,
    os: OsFamily,
    path_var: Option<&OsStr>,
    name: &str,
) -> Vec<PathBuf> {
    let Some(path_var) = path_var else {
        return Vec::new();
    };

    let names = executable_names(os, name);
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| names.iter().map(move |n| dir.join(n)).collect::<Vec<_>>())
        .filter(|candidate| fs.is_file(candidate))
        .collect()
}

/// Full ordered, de-duplicated candidate list for `name`.
pub fn candidate_list(
    fs: &dyn FileSystem,
    os: OsFamily,
    path_var: Option<&OsStr>,
    name: &str,
    extras: &[PathBuf],
) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();

    let ordered = search_path(fs, os, path_var, name)
        .into_iter()
        .chain(std::iter::once(PathBuf::from(name)))
        .chain(fallback_locations(os, name))
        .chain(extras.iter().cloned());

    for candidate in ordered {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}
