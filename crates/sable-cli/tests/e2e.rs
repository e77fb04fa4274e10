// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests driving the compiled `sable` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn sable(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sable"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run sable binary")
}

fn write_project(root: &Path, manifest: &str, sources: &[(&str, &str)]) {
    fs::write(root.join("sable.project"), manifest).expect("write manifest");
    for (relative, text) in sources {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create source dir");
        fs::write(path, text).expect("write source");
    }
}

#[test]
fn build_clean_project_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: hello\nsourcePaths:\n  src\n",
        &[(
            "src/main.sb",
            "module main;\nfn main(){\n    writeln(\"Hello\");\n}\n",
        )],
    );

    let output = sable(&["build", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.is_empty(), "expected clean stderr, got: {stderr}");
}

#[test]
fn build_reports_diagnostics_and_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: broken\nsourcePaths:\n  src\n",
        &[("src/main.sb", "module a;\nmodule a;\n")],
    );

    let output = sable(&["build", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("main.sb(2) Error: Only one module statement is allowed per module."),
        "stderr: {stderr}"
    );
}

#[test]
fn build_checks_include_files_exist() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: includes\nsourcePaths:\n  src\n",
        &[("src/main.sb", "module main;\ninclude \"missing.h\";\n")],
    );

    let output = sable(&["build", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("Include file 'missing.h' could not be found."),
        "stderr: {stderr}"
    );
}

#[test]
fn build_checks_import_targets() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: imports\nsourcePaths:\n  src\n",
        &[
            ("src/main.sb", "module main;\nimport helpers;\nimport nowhere;\n"),
            ("src/helpers.sb", "module helpers;\n"),
        ],
    );

    let output = sable(&["build", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("Import target 'nowhere' could not be found."),
        "stderr: {stderr}"
    );
    assert!(
        !stderr.contains("Import target 'helpers'"),
        "stderr: {stderr}"
    );
}

#[test]
fn build_accepts_dependency_imports() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: deps\nsourcePaths:\n  src\ndependencies:\n  corelib:\n    version: 1.0.0\n",
        &[("src/main.sb", "module main;\nimport corelib;\n")],
    );

    let output = sable(&["build", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
}

#[test]
fn build_writes_parse_tree_dumps() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "name: dumps\nsourcePaths:\n  src\n",
        &[("src/main.sb", "module main;\nfn main(){ }\n")],
    );

    let output = sable(&["build", ".", "--dump-parse-trees"], dir.path());
    assert!(output.status.success());

    let dump = dir.path().join("parsertrees").join("parsertree_main.json");
    let json = fs::read_to_string(dump).expect("dump file");
    assert!(json.contains("\"module\""), "json: {json}");
}

#[test]
fn check_single_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("one.sb");
    fs::write(&file, "module one;\nvar x = (1 + 2;\n").expect("write source");

    let output = sable(&["check", "one.sb"], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("one.sb(2) Error: Missing ')' from expression."),
        "stderr: {stderr}"
    );
}

#[test]
fn check_clean_directory_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("lib.sb"), "module lib;\n").expect("write source");

    let output = sable(&["check", "."], dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
}
