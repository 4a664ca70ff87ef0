use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_docfetch_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("docfetch")
}

fn docfetch() -> Command {
    let mut cmd = Command::new(get_docfetch_bin());
    cmd.env_remove("CHROME_PATH");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("DOCFETCH_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[test]
fn test_no_arguments_prints_usage() {
    docfetch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("<URL>"))
        .stderr(predicate::str::contains("<OUTPUT_NAME>"));
}

#[test]
fn test_missing_output_name_prints_usage() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("docs");

    docfetch()
        .arg("https://example.com")
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("<OUTPUT_NAME>"));

    assert!(!output_dir.exists());
}

#[test]
fn test_help_lists_options() {
    docfetch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("headless Chrome"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--user-agent"))
        .stdout(predicate::str::contains("--nav-timeout"))
        .stdout(predicate::str::contains("--challenge-marker"))
        .stdout(predicate::str::contains("--challenge-timeout"))
        .stdout(predicate::str::contains("--settle-ms"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_version_flag() {
    docfetch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("docfetch"));
}

#[test]
fn test_invalid_output_name_fails_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("docs");

    docfetch()
        .arg("https://example.com")
        .arg("../escape")
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output name"));

    assert!(!output_dir.exists());
}

#[test]
fn test_unsupported_scheme_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    docfetch()
        .arg("ftp://example.com/manual")
        .arg("manual")
        .arg("--output-dir")
        .arg(temp_dir.path())
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}

#[test]
fn test_missing_chrome_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();

    docfetch()
        .arg("https://example.com")
        .arg("manual")
        .arg("--output-dir")
        .arg(temp_dir.path())
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Fetching: https://example.com"))
        .stderr(predicate::str::contains("Chrome not found"));

    assert!(!temp_dir.path().join("manual.html").exists());
    assert!(!temp_dir.path().join("manual.txt").exists());
}

#[test]
fn test_chrome_path_from_environment() {
    let temp_dir = TempDir::new().unwrap();

    docfetch()
        .env("CHROME_PATH", "/nonexistent/env-chrome")
        .arg("https://example.com")
        .arg("manual")
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/env-chrome"));
}

#[test]
fn test_zero_navigation_timeout_is_rejected() {
    docfetch()
        .arg("https://example.com")
        .arg("manual")
        .arg("--nav-timeout")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--nav-timeout"));
}

#[test]
fn test_nav_timeout_from_environment_is_validated() {
    docfetch()
        .env("DOCFETCH_NAV_TIMEOUT", "0")
        .arg("https://example.com")
        .arg("manual")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--nav-timeout"));
}

#[test]
fn test_json_format_is_accepted() {
    let temp_dir = TempDir::new().unwrap();

    // Fails on the missing browser, after the format flag parsed
    docfetch()
        .arg("https://example.com")
        .arg("manual")
        .arg("--format")
        .arg("json")
        .arg("--output-dir")
        .arg(temp_dir.path())
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Fetching:").not())
        .stderr(predicate::str::contains("Chrome not found"));
}
