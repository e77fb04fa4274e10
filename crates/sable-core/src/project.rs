// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project root discovery utilities.
//!
//! Shared project discovery logic for Sable tooling. The compiler proper
//! never touches the filesystem; callers (the CLI, editors) use this to
//! locate the project root before loading `sable.project`.

use std::path::{Path, PathBuf};

/// Project marker files/directories, in priority order.
///
/// Earlier markers take priority: if `sable.project` is found, discovery
/// stops even if `.git/` exists in a parent directory.
const PROJECT_MARKERS: &[&str] = &[".sable", "sable.project", ".git"];

/// Discover the Sable project root by walking up the directory tree.
///
/// Starts at `start_dir` and returns the first ancestor containing a
/// recognized project marker, or `start_dir` if no marker is found.
#[must_use]
pub fn discover_project_root(start_dir: &Path) -> PathBuf {
    let mut current = start_dir.to_path_buf();
    loop {
        // Check Sable-specific markers first (highest priority).
        for marker in &PROJECT_MARKERS[..PROJECT_MARKERS.len() - 1] {
            if current.join(marker).exists() {
                return current;
            }
        }

        // Check generic fallback marker (.git)
        if let Some(marker) = PROJECT_MARKERS.last() {
            if current.join(marker).exists() {
                return current;
            }
        }

        if !current.pop() {
            break;
        }
    }

    start_dir.to_path_buf()
}
