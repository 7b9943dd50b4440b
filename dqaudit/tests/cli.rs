//! Command execution tests against files on disk.
//!
//! This test suite covers:
//! - `check` in every output format, to stdout and to a file
//! - `profile` with and without schema inference
//! - `issues` with full and flat listings
//! - Configuration files and threshold overrides

#![allow(clippy::unwrap_used)]

use std::io::Write;

use clap::Parser;
use dqaudit::{Cli, execute_cli};
use tempfile::{NamedTempFile, TempDir};

const PEOPLE_CSV: &str = "id,age,email\n1,30,a@example.com\n2,150,broken\n3,45,c@example.com\n";

/// Writes `content` to a temporary file with the given suffix.
fn create_input(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dqaudit", "--disable-anomaly-detection"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_check_text_summary() {
    let input = create_input(PEOPLE_CSV, ".csv");
    let output = execute_cli(&cli(&["check", input.path().to_str().unwrap()]))
        .await
        .unwrap();

    assert!(output.starts_with("Data Quality Report"));
    assert!(output.contains("Total Rows: 3"));
    assert!(output.contains("DQ Score: 64.00"));
    assert!(output.contains("age - Range Violation - 1 values outside 0 - 120"));
}

#[tokio::test]
async fn test_check_json_report() {
    let input = create_input(PEOPLE_CSV, ".csv");
    let output = execute_cli(&cli(&["check", "--format", "json", input.path().to_str().unwrap()]))
        .await
        .unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["row_count"], 3);
    assert_eq!(report["violations"].as_array().unwrap().len(), 3);
    assert_eq!(report["violations"][1]["type"], "Range Violation");
    assert_eq!(report["validations"][0]["rule"], "datatype");
}

#[tokio::test]
async fn test_check_csv_to_file() {
    let input = create_input(PEOPLE_CSV, ".csv");
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("violations.csv");

    let message = execute_cli(&cli(&[
        "check",
        "--format",
        "csv",
        "-o",
        out_path.to_str().unwrap(),
        input.path().to_str().unwrap(),
    ]))
    .await
    .unwrap();

    assert!(message.contains("3 violations"));
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written.lines().next(), Some("column,type,details"));
    assert_eq!(written.lines().count(), 4);
}

#[tokio::test]
async fn test_compress_requires_output() {
    let input = create_input(PEOPLE_CSV, ".csv");
    let result = execute_cli(&cli(&["check", "--compress", input.path().to_str().unwrap()])).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_profile_with_schema() {
    let input = create_input(
        r#"[{"id": 1, "joined": "2024-01-01"}, {"id": 2, "joined": "2024-02-01"}, {"id": 3, "joined": null}]"#,
        ".json",
    );
    let output = execute_cli(&cli(&["profile", "--schema", input.path().to_str().unwrap()]))
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["profile"]["summary"]["n_rows"], 3);
    assert_eq!(value["profile"]["summary"]["missing_values"], 1);
    assert_eq!(value["schema"][1]["inferred_type"], "datetime");
    assert_eq!(value["schema"][1]["nullable"], true);
}

#[tokio::test]
async fn test_issues_listing() {
    let input = create_input("id,code\n1,a\n2,b\n2,b\n", ".csv");
    let path = input.path().to_str().unwrap();

    let full = execute_cli(&cli(&["issues", path])).await.unwrap();
    let issues: serde_json::Value = serde_json::from_str(&full).unwrap();
    let first = &issues[0];
    assert_eq!(first["rule_name"], "Duplicate Rows");
    assert_eq!(first["severity"], "HIGH");
    assert!(first["sample_rows"].is_array());

    let flat = execute_cli(&cli(&["issues", "--flat", path])).await.unwrap();
    let records: serde_json::Value = serde_json::from_str(&flat).unwrap();
    assert!(records[0].get("sample_rows").is_none());
    assert_eq!(records.as_array().unwrap().len(), issues.as_array().unwrap().len());
}

#[tokio::test]
async fn test_config_file_and_overrides() {
    let input = create_input(PEOPLE_CSV, ".csv");
    // raising the conformance limit silences the email column finding
    let config = create_input(r#"{"type_conformance_max_bad": 1.0}"#, ".json");

    let output = execute_cli(&cli(&[
        "--config",
        config.path().to_str().unwrap(),
        "check",
        "--format",
        "json",
        input.path().to_str().unwrap(),
    ]))
    .await
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["violations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() {
    let input = create_input(PEOPLE_CSV, ".csv");
    let config = create_input(r#"{"lookup_top_n": 0}"#, ".json");

    let result = execute_cli(&cli(&[
        "--config",
        config.path().to_str().unwrap(),
        "check",
        input.path().to_str().unwrap(),
    ]))
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.csv");
    let result = execute_cli(&cli(&["check", missing.to_str().unwrap()])).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("absent.csv"));
}
