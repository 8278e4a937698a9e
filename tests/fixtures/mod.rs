//! Test fixtures for fuel-planner.
//!
//! Provides:
//! - Real towns along the I-40 corridor with matching city and price tables
//! - Synthetic meridian routes with stations at exact mileposts

#![allow(dead_code)]

pub mod i40_corridor;
pub mod meridian;

use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture file");
    path
}
