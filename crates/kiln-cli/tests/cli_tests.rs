//! End-to-end tests for the kiln binary
//!
//! Every toolchain program is `true`, so builds exercise discovery,
//! codegen and orchestration without a cross compiler installed.

#![cfg(unix)]

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const KILN_TOML: &str = r#"
[projects]
search = ["."]

[toolchain]
cc = "true"
assembler = "true"
ld = "true"
ar = "true"
objdump = "true"
"#;

fn manifest(root: &Path, dir: &str, json: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), json).unwrap();
}

/// libc (lib), kernel (kernel, links libc) and m (module)
fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("kiln.toml"), KILN_TOML).unwrap();

    manifest(root, "libc", r#"{"id": "libc", "type": "lib"}"#);
    fs::create_dir_all(root.join("libc/sources")).unwrap();
    fs::write(root.join("libc/sources/string.c"), "").unwrap();

    manifest(
        root,
        "kernel",
        r#"{"id": "kernel", "type": "kernel", "libs": ["libc"]}"#,
    );
    fs::create_dir_all(root.join("kernel/sources")).unwrap();
    fs::write(root.join("kernel/sources/main.c"), "").unwrap();
    fs::create_dir_all(root.join("kernel/assets")).unwrap();
    fs::write(root.join("kernel/assets/font.bin"), [0u8; 4]).unwrap();

    manifest(root, "drivers/m", r#"{"id": "m", "type": "module"}"#);

    temp_dir
}

fn kiln(root: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kiln");
    cmd.arg("--root")
        .arg(root)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("KILN_CC")
        .env_remove("KILN_AS")
        .env_remove("KILN_LD")
        .env_remove("KILN_AR")
        .env_remove("KILN_OBJDUMP");
    cmd
}

// ============================================================================
// kiln list / info
// ============================================================================

#[test]
fn test_list_json() {
    let ws = create_workspace();

    let output = kiln(ws.path()).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let projects: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["kernel", "libc", "m"]);
    assert_eq!(projects[0]["kind"], "kernel");
    assert_eq!(projects[1]["kind"], "lib");
    assert_eq!(projects[2]["kind"], "module");
}

#[test]
fn test_list_human() {
    let ws = create_workspace();

    kiln(ws.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("libc"))
        .stdout(predicate::str::contains("kernel.bin"));
}

#[test]
fn test_info_json_resolves_closures() {
    let ws = create_workspace();

    let output = kiln(ws.path())
        .args(["info", "kernel", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["link_closure"], serde_json::json!(["libc"]));
    assert_eq!(info["libraries"].as_array().unwrap().len(), 1);
    assert!(info["libraries"][0]
        .as_str()
        .unwrap()
        .ends_with("libc.lib"));
}

#[test]
fn test_info_unknown_project() {
    let ws = create_workspace();

    kiln(ws.path())
        .args(["info", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found: nope"));
}

// ============================================================================
// kiln build / clean
// ============================================================================

#[test]
fn test_build_kernel() {
    let ws = create_workspace();
    let root = ws.path();

    kiln(root)
        .args(["build", "kernel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built kernel"));

    let meta = fs::read_to_string(root.join("kernel/obj/__meta.h")).unwrap();
    assert!(meta.contains("#define __PROJECT_ID \"kernel\""));
    let assets = fs::read_to_string(root.join("kernel/obj/__assets.h")).unwrap();
    assert!(assets.contains("__kernel_font_bin_start"));
    assert!(root.join("libc/obj/__meta.h").is_file());
    assert!(root.join("kernel/bin/kernel.bin.asm").is_file());
    assert!(!root.join("drivers/m/obj").exists());
}

#[test]
fn test_build_module_fails_at_link() {
    let ws = create_workspace();

    kiln(ws.path())
        .args(["build", "m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("during link"))
        .stderr(predicate::str::contains("cannot be linked yet"));
}

#[test]
fn test_build_all_reports_failure_but_builds_rest() {
    let ws = create_workspace();

    kiln(ws.path())
        .arg("build")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Built libc"))
        .stdout(predicate::str::contains("Built kernel"))
        .stderr(predicate::str::contains("1 project(s) failed"));
}

#[test]
fn test_build_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("kiln.toml"), KILN_TOML).unwrap();
    manifest(root, "a", r#"{"id": "a", "type": "lib", "libs": ["b"]}"#);
    manifest(root, "b", r#"{"id": "b", "type": "lib", "libs": ["a"]}"#);

    kiln(root)
        .args(["build", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn test_build_unknown_id() {
    let ws = create_workspace();

    kiln(ws.path())
        .args(["build", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown project 'ghost'"));
}

#[test]
fn test_clean_removes_outputs() {
    let ws = create_workspace();
    let root = ws.path();

    kiln(root).args(["build", "libc"]).assert().success();
    assert!(root.join("libc/obj").is_dir());

    kiln(root)
        .args(["clean", "libc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned 1 project(s)"));
    assert!(!root.join("libc/obj").exists());
    assert!(!root.join("libc/bin").exists());
}

#[test]
fn test_rebuild_regenerates() {
    let ws = create_workspace();
    let root = ws.path();

    kiln(root).args(["rebuild", "libc"]).assert().success();
    assert!(root.join("libc/obj/__assets.s").is_file());
}

#[test]
fn test_env_override_replaces_tool() {
    let ws = create_workspace();

    kiln(ws.path())
        .args(["build", "libc"])
        .env("KILN_AR", "kiln-test-missing-archiver")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kiln-test-missing-archiver"));
}

#[test]
fn test_dependent_reports_stage_of_failed_dependency() {
    let ws = create_workspace();

    kiln(ws.path())
        .args(["build", "libc", "kernel"])
        .env("KILN_CC", "false")
        .assert()
        .failure()
        .stderr(predicate::str::contains("libc during compile"))
        .stderr(predicate::str::contains("kernel during compile"))
        .stderr(predicate::str::contains("2 project(s) failed"));
}
