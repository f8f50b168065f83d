// tests/candidates_property.rs
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use proptest::prelude::*;

use devlaunch::fs::mock::MockFileSystem;
use devlaunch::toolchain::{RuntimeVersion, candidate_list};
use devlaunch::types::OsFamily;

// Directories drawn from a small pool so PATH entries repeat and some of them
// hold the tool while others don't.
fn dir_pool() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "/usr/bin",
        "/usr/local/bin",
        "/opt/node/bin",
        "/snap/bin",
        "/home/dev/.nvm/bin",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn candidate_list_is_ordered_and_unique(
        path_dirs in prop::collection::vec(dir_pool(), 0..8),
        installed in prop::collection::vec(dir_pool(), 0..5),
        extras in prop::collection::vec(dir_pool(), 0..3),
    ) {
        let fs = MockFileSystem::new();
        for dir in &installed {
            fs.add_file(PathBuf::from(dir).join("npm"));
        }
        let extras: Vec<PathBuf> = extras.iter().map(|d| PathBuf::from(d).join("npm")).collect();
        let path_var = OsString::from(path_dirs.join(":"));

        let list = candidate_list(&fs, OsFamily::Unix, Some(&path_var), "npm", &extras);

        let unique: HashSet<_> = list.iter().collect();
        prop_assert_eq!(unique.len(), list.len());

        let bare = list.iter().position(|p| *p == PathBuf::from("npm"));
        prop_assert!(bare.is_some());
        let bare = bare.unwrap();

        // Everything before the bare name is an installed PATH hit, in PATH order.
        let expected_hits: Vec<PathBuf> = {
            let mut seen = HashSet::new();
            path_dirs
                .iter()
                .filter(|d| installed.contains(d))
                .map(|d| PathBuf::from(d).join("npm"))
                .filter(|p| seen.insert(p.clone()))
                .collect()
        };
        prop_assert_eq!(&list[..bare], expected_hits.as_slice());

        for extra in &extras {
            prop_assert!(list.contains(extra));
        }
    }

    #[test]
    fn version_ordering_matches_tuples(
        a in (0u32..5, 0u32..20, 0u32..20),
        b in (0u32..5, 0u32..20, 0u32..20),
    ) {
        let va = RuntimeVersion::new(a.0, a.1, a.2);
        let vb = RuntimeVersion::new(b.0, b.1, b.2);
        prop_assert_eq!(va.satisfies(&vb), a >= b);
    }

    #[test]
    fn banner_round_trips_through_display(major in 2u32..4, minor in 0u32..15, patch in 0u32..30) {
        let v = RuntimeVersion::new(major, minor, patch);
        prop_assert_eq!(RuntimeVersion::from_banner(&format!("Python {v}")), Some(v));
    }
}
