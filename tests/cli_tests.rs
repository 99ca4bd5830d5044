//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn xsdgrammar_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xsdgrammar"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn library() -> String {
    fixtures_dir().join("library.xsd").to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> Output {
    Command::new(xsdgrammar_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_basic() {
    let schema = library();
    let output = run(&["inspect", &schema]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("xmlschema-grammar"), "should show version");
    assert!(stdout.contains("http://example.com/library"), "should show namespace");
    assert!(stdout.contains("Global Elements: 5"), "should show global element count");
    assert!(stdout.contains("Element Declarations: 10"), "should count local declarations");
    assert!(stdout.contains("substitutionGroup"), "should show substitution links");
}

#[test]
fn test_cli_inspect_json_output() {
    let schema = library();
    let output = run(&["inspect", "--json", &schema]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "inspect --json should succeed");

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["targetNamespace"], "http://example.com/library");
    assert_eq!(json["kind"], "schema");
    assert_eq!(json["elements"].as_array().map(Vec::len), Some(10));
}

#[test]
fn test_cli_inspect_reports_ingestion_errors() {
    let schema = fixtures_dir().join("broken.xsd");
    let output = run(&["inspect", schema.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "inspect should fail when ingestion recorded errors");
    assert!(stderr.contains("unknown type"), "should print the ingestion problem");
    assert!(stdout.contains("Ingestion Errors: 1"), "should still print the summary");
}

#[test]
fn test_cli_inspect_missing_file() {
    let output = run(&["inspect", "/nonexistent/schema.xsd"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Error:"));
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_cli_validate_valid_children() {
    let schema = library();
    let output = run(&[
        "validate", &schema,
        "--element", "library",
        "--children", "name,book,magazine",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "substitutes should be accepted");
    assert!(stdout.contains("Content is valid"));
}

#[test]
fn test_cli_validate_invalid_children() {
    let schema = library();
    let output = run(&[
        "validate", &schema,
        "--element", "library",
        "--children", "book,name",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "validation should fail");
    assert!(stdout.contains("Content is invalid"));
    assert!(stdout.contains("child 0"), "should report the failing position");
}

#[test]
fn test_cli_validate_incomplete_children() {
    let schema = library();
    let output = run(&["validate", &schema, "--element", "library", "--children", "name"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("Content is incomplete"));
}

#[test]
fn test_cli_validate_simple_content() {
    let schema = library();
    let valid = run(&[
        "validate", &schema,
        "--element", "shelf",
        "--children", "#PCDATA",
        "--text", "3",
    ]);
    assert!(valid.status.success());

    let invalid = run(&[
        "validate", &schema,
        "--element", "shelf",
        "--children", "#PCDATA",
        "--text", "0",
    ]);
    let stdout = String::from_utf8_lossy(&invalid.stdout);
    assert!(!invalid.status.success());
    assert!(stdout.contains("positiveInteger"), "should name the rejecting datatype");
}

#[test]
fn test_cli_validate_unknown_element() {
    let schema = library();
    let output = run(&["validate", &schema, "--element", "nonexistent"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("not found"), "should report element not found");
}

// ============================================================================
// Insert Command Tests
// ============================================================================

#[test]
fn test_cli_insert_candidates() {
    let schema = library();
    let output = run(&[
        "insert", &schema,
        "--element", "library",
        "--children", "name",
        "--at", "1",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("✓ {http://example.com/library}publication"));
    assert!(stdout.contains("✗ {http://example.com/library}name"));
    assert!(stdout.contains("end of content: invalid"));
}

#[test]
fn test_cli_insert_offset_past_end() {
    let schema = library();
    let output = run(&[
        "insert", &schema,
        "--element", "library",
        "--children", "name",
        "--at", "5",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("past the end"));
}
