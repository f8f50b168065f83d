#![allow(dead_code)]

use std::path::PathBuf;

pub use devlaunch_test_utils::{init_tracing, with_timeout};
use devlaunch_test_utils::builders::PROJECT_ROOT;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn root() -> PathBuf {
    PathBuf::from(PROJECT_ROOT)
}
