//! Integration tests for the line, key path and manifest patchers

use bump_release::patchers::{
    PatchError, key_path_patcher::patch_key_path, line_patcher::patch_line,
    manifest_patcher::patch_manifest,
};
use bump_release::rules::{
    DOCS_RELEASE_PATTERN, DOCS_RELEASE_TEMPLATE, DOCS_VERSION_PATTERN, DOCS_VERSION_TEMPLATE,
    MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, SETUP_PATTERN, SETUP_TEMPLATE, SONAR_PATTERN,
    SONAR_TEMPLATE,
};
use bump_release::version::Version;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn version() -> Version {
    Version::new("1", "2", "3")
}

// ============================================================================
// Line Patcher
// ============================================================================

const MAIN_FILE: &str = r#""""
My application
"""
__version__ = VERSION = "0.1.0"
__author__ = "someone"
"#;

#[test]
fn test_main_project_dry_run_returns_line_and_keeps_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "__init__.py", MAIN_FILE);

    let row = patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), true).unwrap();

    assert_eq!(row.as_deref(), Some("__version__ = VERSION = \"1.2.3\"\n"));
    assert_eq!(fs::read(&file).unwrap(), MAIN_FILE.as_bytes());
}

#[test]
fn test_main_project_update_changes_only_matched_line() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "__init__.py", MAIN_FILE);

    let row = patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), false).unwrap();

    assert_eq!(row.as_deref(), Some("__version__ = VERSION = \"1.2.3\"\n"));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        MAIN_FILE.replace(r#""0.1.0""#, r#""1.2.3""#)
    );
}

#[test]
fn test_sonar_properties() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(
        &temp_dir,
        "sonar-project.properties",
        "sonar.projectKey=app\nsonar.projectVersion=0.1\nsonar.sources=src\n",
    );

    let row = patch_line(&file, SONAR_PATTERN, SONAR_TEMPLATE, &version(), false).unwrap();

    assert_eq!(row.as_deref(), Some("sonar.projectVersion=1.2\n"));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "sonar.projectKey=app\nsonar.projectVersion=1.2\nsonar.sources=src\n"
    );
}

#[test]
fn test_setup_py() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(
        &temp_dir,
        "setup.py",
        "setup(\n    name=\"app\",\n    version=\"0.1.0\",\n    packages=[],\n)\n",
    );

    patch_line(&file, SETUP_PATTERN, SETUP_TEMPLATE, &Version::new("2", "0", "0b1"), false).unwrap();

    assert!(fs::read_to_string(&file).unwrap().contains("    version=\"2.0.0b1\",\n"));
}

#[test]
fn test_docs_conf_two_rows() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(
        &temp_dir,
        "conf.py",
        "project = 'app'\nversion = '0.1'\nrelease = '0.1.0'\n",
    );

    patch_line(&file, DOCS_RELEASE_PATTERN, DOCS_RELEASE_TEMPLATE, &version(), false).unwrap();
    patch_line(&file, DOCS_VERSION_PATTERN, DOCS_VERSION_TEMPLATE, &version(), false).unwrap();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "project = 'app'\nversion = \"1.2\"\nrelease = \"1.2.3\"\n"
    );
}

#[test]
fn test_crlf_line_ending_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "app.py", "# app\r\n__version__ = VERSION = '0.1.0'\r\nx = 1\r\n");

    let row = patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), false).unwrap();

    assert_eq!(row.as_deref(), Some("__version__ = VERSION = \"1.2.3\"\r\n"));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "# app\r\n__version__ = VERSION = \"1.2.3\"\r\nx = 1\r\n"
    );
}

#[test]
fn test_bare_cr_and_missing_final_newline() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "legacy.cfg", "name = app\rversion = 0.1.0");

    let row = patch_line(&file, r"^version = ([.\d\w]+)", "version = {major}.{minor}.{release}", &version(), false)
        .unwrap();

    assert_eq!(row.as_deref(), Some("version = 1.2.3"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "name = app\rversion = 1.2.3");
}

#[test]
fn test_only_first_match_is_changed() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "setup.cfg", "version = 0.1.0\nother = 1\nversion = 0.1.0\n");

    patch_line(&file, r"^version = ([.\d\w]+)", "version = {major}.{minor}.{release}", &version(), false).unwrap();

    assert_eq!(fs::read_to_string(&file).unwrap(), "version = 1.2.3\nother = 1\nversion = 0.1.0\n");
}

#[test]
fn test_capture_groups_are_not_interpolated() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "VERSION", "release: 0.1.0 (stable)\n");

    let row = patch_line(&file, r"^release: (\S+) \((\w+)\)$", "release: {major}.{minor}.{release}", &version(), true)
        .unwrap();

    assert_eq!(row.as_deref(), Some("release: 1.2.3\n"));
}

#[test]
fn test_no_match_fails_when_writing() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "__init__.py", "nothing = 'here'\n");

    let err = patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), false).unwrap_err();

    assert!(matches!(err, PatchError::NoMatch { ref path, .. } if path == &file));
    assert_eq!(fs::read_to_string(&file).unwrap(), "nothing = 'here'\n");
}

#[test]
fn test_no_match_in_dry_run_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "__init__.py", "nothing = 'here'\n");

    let row = patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), true).unwrap();

    assert!(row.is_none());
}

#[test]
fn test_empty_file_has_no_match() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "empty.py", "");

    assert!(patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), true).unwrap().is_none());
    assert!(matches!(
        patch_line(&file, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), false),
        Err(PatchError::NoMatch { .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.py");

    let err = patch_line(&missing, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, &version(), false).unwrap_err();

    assert!(matches!(err, PatchError::Io { .. }));
}

#[test]
fn test_invalid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "a.txt", "a\n");

    let err = patch_line(&file, "(unclosed", "{major}", &version(), false).unwrap_err();

    assert!(matches!(err, PatchError::InvalidPattern { .. }));
}

#[test]
fn test_bad_template_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "setup.cfg", "version = 0.1.0\n");

    let err = patch_line(&file, "^version", "version = {patch}", &version(), false).unwrap_err();

    assert!(matches!(err, PatchError::Template(_)));
    assert_eq!(fs::read_to_string(&file).unwrap(), "version = 0.1.0\n");
}

// ============================================================================
// Structured documents
// ============================================================================

#[test]
fn test_ansible_vars_git_version() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(
        &temp_dir,
        "vars.yml",
        "app_name: demo\ngit:\n  repo: git@example.org:demo.git\n  version: 0.1.0\n",
    );

    let output = patch_key_path(&file, "git.version", &version(), false).unwrap();

    let document: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(document["git"]["version"].as_str(), Some("1.2.3"));
    assert_eq!(document["git"]["repo"].as_str(), Some("git@example.org:demo.git"));
    assert_eq!(document["app_name"].as_str(), Some("demo"));
    assert_eq!(fs::read_to_string(&file).unwrap(), output);
}

#[test]
fn test_ansible_vars_formatting_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let original = "---\n# Deployment variables\napp_name: \"demo\"\n\ngit:\n  # pinned release, bumped on every release\n  repo: 'git@example.org:demo.git'\n  version: 0.1.0  # bump me\n...\n";
    let file = write_fixture(&temp_dir, "vars.yml", original);

    patch_key_path(&file, "git.version", &version(), false).unwrap();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        original.replace("version: 0.1.0  # bump me", "version: 1.2.3  # bump me")
    );
}

#[test]
fn test_package_json_version() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_fixture(&temp_dir, "package.json", r#"{"version": "0.1.0", "name": "x"}"#);

    let output = patch_manifest(&file, "version", &version(), false).unwrap();

    let manifest: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(manifest, serde_json::json!({"version": "1.2.3", "name": "x"}));
    assert!(output.find("\"version\"").unwrap() < output.find("\"name\"").unwrap());
}
