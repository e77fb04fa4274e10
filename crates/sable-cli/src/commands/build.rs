// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Build a Sable project.
//!
//! Loads the project manifest, compiles every `.sb` file under the
//! configured source paths into a module AST, prints diagnostics to stderr
//! in the `source(line) Error: message` layout, and runs the trivial
//! existence checks (import targets present in the build, include files on
//! disk). Fails when any error was raised.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use std::collections::HashSet;
use std::fs;
use tracing::{debug, info, instrument};

use sable_core::ast::Module;
use sable_core::diagnostics::Diagnostic;
use sable_core::parse::parse_tree;
use sable_core::project::discover_project_root;
use sable_core::source_analysis::{group, lex};

use crate::manifest;

/// Build the project at `root`.
#[instrument(skip_all, fields(root = %root))]
pub fn build(root: &str, project_file: &str, dump_parse_trees: bool) -> Result<()> {
    let root = resolve_root(root, project_file);
    let manifest = manifest::load_manifest(&root.join(project_file))?;
    info!(name = %manifest.name, "building project");

    let source_dirs: Vec<Utf8PathBuf> = if manifest.source_paths.is_empty() {
        vec![root.join("src")]
    } else {
        manifest
            .source_paths
            .iter()
            .map(|path| root.join(path))
            .collect()
    };

    let mut files = Vec::new();
    for dir in &source_dirs {
        collect_sb_files(dir, &mut files)?;
    }
    if files.is_empty() {
        miette::bail!("No .sb source files found in '{root}'");
    }
    debug!(count = files.len(), "found source files");

    let mut error_count = 0_usize;
    let mut compiled: Vec<Module> = Vec::new();
    for file in &files {
        let (module, errors) = compile_file(&root, file, dump_parse_trees)?;
        error_count += errors;
        compiled.push(module);
    }

    error_count += run_existence_checks(&root, &manifest, &compiled);

    if error_count > 0 {
        miette::bail!("build failed with {error_count} error(s)");
    }
    info!(modules = compiled.len(), "build complete");
    Ok(())
}

/// Resolves the project root: the given path when it already holds the
/// manifest, otherwise the nearest marked ancestor.
fn resolve_root(root: &str, project_file: &str) -> Utf8PathBuf {
    let start = Utf8PathBuf::from(root);
    if start.join(project_file).exists() {
        return start;
    }
    Utf8PathBuf::from_path_buf(discover_project_root(start.as_std_path()))
        .unwrap_or(start)
}

/// Compiles one source file, printing its diagnostics.
///
/// Returns the parsed module and the number of errors emitted.
fn compile_file(
    root: &Utf8Path,
    file: &Utf8Path,
    dump_parse_trees: bool,
) -> Result<(Module, usize)> {
    let text = fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read source file '{file}'"))?;
    let label = file.strip_prefix(root).unwrap_or(file).as_str();

    let tree = group(lex(&text));
    let (module, diagnostics) = parse_tree(label, &tree);
    for diagnostic in diagnostics.emitted() {
        eprintln!("{diagnostic}");
    }

    if dump_parse_trees && !module.name.is_empty() {
        let dump_dir = root.join("parsertrees");
        fs::create_dir_all(&dump_dir)
            .into_diagnostic()
            .wrap_err("Failed to create parsertrees directory")?;
        let dump_path = dump_dir.join(format!("parsertree_{}.json", module.name));
        let json = serde_json::to_string_pretty(&tree).into_diagnostic()?;
        fs::write(&dump_path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write parse tree dump '{dump_path}'"))?;
        debug!(path = %dump_path, "wrote parse tree dump");
    }

    Ok((module, diagnostics.emitted().len()))
}

/// Trivial existence checks across the compiled module set: every import
/// target must name a module in this build (or a declared dependency), and
/// every include path must exist under the project root.
fn run_existence_checks(
    root: &Utf8Path,
    manifest: &manifest::ProjectManifest,
    compiled: &[Module],
) -> usize {
    let module_names: HashSet<&str> = compiled.iter().map(|m| m.name.as_str()).collect();
    let dependency_names: HashSet<&str> = manifest
        .dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    let mut errors = 0;
    for module in compiled {
        for import in &module.imports {
            if !module_names.contains(import.path.as_str())
                && !dependency_names.contains(import.path.as_str())
            {
                let diagnostic = Diagnostic::new(
                    module.source.clone(),
                    import.line,
                    format!("Import target '{}' could not be found.", import.path),
                );
                eprintln!("{diagnostic}");
                errors += 1;
            }
        }
        for include in &module.includes {
            if !root.join(include.path.as_str()).exists() {
                let diagnostic = Diagnostic::new(
                    module.source.clone(),
                    include.line,
                    format!("Include file '{}' could not be found.", include.path),
                );
                eprintln!("{diagnostic}");
                errors += 1;
            }
        }
    }
    errors
}

/// Recursively collects `.sb` files from a directory tree.
///
/// Symlinks are skipped to avoid potential infinite recursion from circular
/// links.
pub fn collect_sb_files(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory '{dir}'"))?
    {
        let entry = entry.into_diagnostic()?;
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_symlink() {
            continue;
        }
        let entry_path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|_| miette::miette!("Non-UTF-8 path"))?;

        if file_type.is_dir() {
            collect_sb_files(&entry_path, files)?;
        } else if file_type.is_file() && entry_path.extension() == Some("sb") {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(())
}
