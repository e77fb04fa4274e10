// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project manifest parsing and validation.
//!
//! Parses `sable.project` manifests that define a project's identity and
//! layout. The format is a whitespace-indented `key: value` layout where
//! each nesting level indents two spaces deeper:
//!
//! ```text
//! name: myapp
//! sourcePaths:
//!   src
//!   vendor/extra
//! dependencies:
//!   corelib:
//!     version: 1.2.0
//!     path: ../corelib
//!   tinylog
//! ```
//!
//! Recognized top-level keys: `name`, `sourcePaths` (children are path
//! strings), and `dependencies` (children are dependency names, each with
//! optional `version` and `path` sub-keys).

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use std::fs;

/// A parsed `sable.project` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectManifest {
    /// The project name.
    pub name: String,
    /// Source directories to compile, relative to the project root.
    pub source_paths: Vec<Utf8PathBuf>,
    /// Declared dependencies.
    pub dependencies: Vec<Dependency>,
}

/// One dependency entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The dependency name.
    pub name: String,
    /// Optional required version.
    pub version: Option<String>,
    /// Optional local path override.
    pub path: Option<Utf8PathBuf>,
}

/// A fault in the manifest text.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ManifestError {
    /// Indentation is not a multiple of two spaces, or skips a level.
    #[error("invalid indentation at line {line}")]
    InvalidIndentation {
        /// 1-indexed line of the fault.
        line: usize,
    },

    /// A top-level or dependency sub-key that is not recognized.
    #[error("unknown key '{key}' at line {line}")]
    UnknownKey {
        /// The offending key.
        key: String,
        /// 1-indexed line of the fault.
        line: usize,
    },

    /// A nested entry with no containing block.
    #[error("entry without a containing block at line {line}")]
    OrphanEntry {
        /// 1-indexed line of the fault.
        line: usize,
    },

    /// The required `name` key is absent.
    #[error("missing 'name' key in project manifest")]
    MissingName,
}

/// The top-level block an indented line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    SourcePaths,
    Dependencies,
}

/// Parses manifest text into a [`ProjectManifest`].
pub fn parse_manifest(content: &str) -> Result<ProjectManifest, ManifestError> {
    let mut manifest = ProjectManifest::default();
    let mut section = Section::None;

    for (index, raw_line) in content.lines().enumerate() {
        let line = index + 1;
        if raw_line.trim().is_empty() {
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start_matches(' ').len();
        if indent % 2 != 0 {
            return Err(ManifestError::InvalidIndentation { line });
        }
        let level = indent / 2;
        let text = raw_line.trim();

        match level {
            0 => {
                let (key, value) = split_key(text);
                match key {
                    "name" => {
                        manifest.name = value.to_string();
                        section = Section::None;
                    }
                    "sourcePaths" => section = Section::SourcePaths,
                    "dependencies" => section = Section::Dependencies,
                    _ => {
                        return Err(ManifestError::UnknownKey {
                            key: key.to_string(),
                            line,
                        });
                    }
                }
            }
            1 => match section {
                Section::SourcePaths => {
                    manifest.source_paths.push(Utf8PathBuf::from(text));
                }
                Section::Dependencies => {
                    let (name, _) = split_key(text);
                    manifest.dependencies.push(Dependency {
                        name: name.to_string(),
                        version: None,
                        path: None,
                    });
                }
                Section::None => return Err(ManifestError::OrphanEntry { line }),
            },
            2 if section == Section::Dependencies => {
                let Some(dependency) = manifest.dependencies.last_mut() else {
                    return Err(ManifestError::OrphanEntry { line });
                };
                let (key, value) = split_key(text);
                match key {
                    "version" => dependency.version = Some(value.to_string()),
                    "path" => dependency.path = Some(Utf8PathBuf::from(value)),
                    _ => {
                        return Err(ManifestError::UnknownKey {
                            key: key.to_string(),
                            line,
                        });
                    }
                }
            }
            _ => return Err(ManifestError::InvalidIndentation { line }),
        }
    }

    if manifest.name.is_empty() {
        return Err(ManifestError::MissingName);
    }
    Ok(manifest)
}

/// Splits `key: value` into its parts; a line without `:` is its own key.
fn split_key(text: &str) -> (&str, &str) {
    match text.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (text, ""),
    }
}

/// Parses a `sable.project` file from disk.
pub fn load_manifest(path: &Utf8Path) -> Result<ProjectManifest> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read manifest '{path}'"))?;
    parse_manifest(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse manifest '{path}'"))
}

/// Looks for `sable.project` in the given directory and parses it if found.
///
/// Returns `None` if no manifest file exists; an error if the file exists
/// but is malformed.
pub fn find_manifest(project_root: &Utf8Path) -> Result<Option<ProjectManifest>> {
    let manifest_path = project_root.join("sable.project");
    if manifest_path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat manifest '{manifest_path}'"))?
    {
        load_manifest(&manifest_path).map(Some)
    } else {
        Ok(None)
    }
}
