// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Check Sable source files for errors without building.
//!
//! Accepts a single `.sb` file or a project directory. Diagnostics print to
//! stderr in the standard layout; the command fails when any were raised.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use std::fs;
use tracing::{info, instrument};

use sable_core::parse_source;

use super::build::collect_sb_files;
use crate::manifest;

/// Check the file or project at `path`.
#[instrument(skip_all, fields(path = %path))]
pub fn check(path: &str) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    let files = find_files(&path)?;
    if files.is_empty() {
        miette::bail!("No .sb source files found in '{path}'");
    }

    let mut error_count = 0_usize;
    for file in &files {
        let text = fs::read_to_string(file)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read source file '{file}'"))?;
        let label = file
            .strip_prefix(&path)
            .ok()
            .filter(|relative| !relative.as_str().is_empty())
            .map_or(file.as_str(), Utf8Path::as_str);
        let (_module, diagnostics) = parse_source(label, &text);
        for diagnostic in diagnostics.emitted() {
            eprintln!("{diagnostic}");
        }
        error_count += diagnostics.emitted().len();
    }

    if error_count > 0 {
        miette::bail!("check failed with {error_count} error(s)");
    }
    info!(files = files.len(), "check passed");
    Ok(())
}

/// Finds the `.sb` files named by `path`: the file itself, the manifest's
/// source paths, or the directory tree.
fn find_files(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension() != Some("sb") {
            miette::bail!("File '{path}' is not a .sb source file");
        }
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        if let Some(project) = manifest::find_manifest(path)? {
            if project.source_paths.is_empty() {
                collect_sb_files(&path.join("src"), &mut files)?;
            } else {
                for dir in &project.source_paths {
                    collect_sb_files(&path.join(dir), &mut files)?;
                }
            }
        } else {
            collect_sb_files(path, &mut files)?;
        }
    } else {
        miette::bail!("Path '{path}' does not exist");
    }

    Ok(files)
}
