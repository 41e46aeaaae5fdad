// Integration tests for `catstat analyze`

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// ============================================================================
// Input selection
// ============================================================================

#[test]
fn test_analyze_sample_text_output() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--sample");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Observations:   95"))
        .stdout(predicate::str::contains("Distinct:       11"))
        .stdout(predicate::str::contains("Mode:           BLUE"))
        .stdout(predicate::str::contains("Median:         GREEN"))
        .stdout(predicate::str::contains("Variance:       0.007560"))
        .stdout(predicate::str::contains("P(RED):"))
        .stdout(predicate::str::contains("0.0947"));
}

#[test]
fn test_analyze_requires_input_or_sample() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--input FILE or --sample"));
}

#[test]
fn test_analyze_missing_input_file() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--input").arg("/nonexistent/obs.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read observations file"));
}

#[test]
fn test_analyze_empty_observations_fail() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("empty.json");
    fs::write(&input, r#"{"MONDAY": []}"#).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--input").arg(&input);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

// ============================================================================
// Configuration and normalization
// ============================================================================

#[test]
fn test_analyze_builtin_rules_normalize_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--format")
        .arg("csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("RED,3,0.500000"))
        .stdout(predicate::str::contains("BLUE,2,0.333333"))
        .stdout(predicate::str::contains("BLEW").not());
}

#[test]
fn test_analyze_no_normalize_keeps_raw_labels() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--format")
        .arg("csv")
        .arg("--no-normalize");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("BLEW,1,"))
        .stdout(predicate::str::contains("BLUE,1,"));
}

#[test]
fn test_analyze_config_file_sets_target() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--config")
        .arg(fixture("rules.toml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("P(BLUE):"))
        .stdout(predicate::str::contains("0.3333"));
}

#[test]
fn test_analyze_target_flag_overrides_config() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--config")
        .arg(fixture("rules.toml"))
        .arg("--target")
        .arg("GREEN");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("P(GREEN):"))
        .stdout(predicate::str::contains("0.1667"));
}

#[test]
fn test_analyze_invalid_config() {
    let tmp_dir = TempDir::new().unwrap();
    let config = tmp_dir.path().join("bad.toml");
    fs::write(&config, "[normalization]\nRED = \"RED\"\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--sample").arg("--config").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

// ============================================================================
// Output formats
// ============================================================================

#[test]
fn test_analyze_json_output() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--sample").arg("--format").arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "catstat-json-v1");
    assert_eq!(json["total_observations"], 95);
    assert_eq!(json["mode"], "BLUE");
    assert_eq!(json["median"], "GREEN");
    assert_eq!(json["variance"]["distinct_count"], 11);
    assert_eq!(json["target"]["category"], "RED");
    assert_eq!(json["frequencies"][0]["category"], "GREEN");
    assert_eq!(json["corrections"][1][0], "BLEW");
}

#[test]
fn test_analyze_csv_output_header() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze").arg("--sample").arg("--format").arg("csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("category,count,relative_frequency\nBLUE,31,"));
}

// ============================================================================
// Frequency store
// ============================================================================

#[test]
fn test_analyze_store_is_idempotent() {
    let tmp_dir = TempDir::new().unwrap();
    let store = tmp_dir.path().join("freq.csv");

    for _ in 0..2 {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
        cmd.arg("analyze")
            .arg("--input")
            .arg(fixture("observations.json"))
            .arg("--store")
            .arg(&store);
        cmd.assert().success();
    }

    let content = fs::read_to_string(&store).unwrap();
    assert_eq!(content, "category,frequency\nRED,3\nBLUE,2\nGREEN,1\n");
}

#[test]
fn test_analyze_store_upserts_existing_rows() {
    let tmp_dir = TempDir::new().unwrap();
    let store = tmp_dir.path().join("freq.csv");
    fs::write(&store, "category,frequency\nRED,40\nPURPLE,2\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--store")
        .arg(&store);
    cmd.assert().success();

    let content = fs::read_to_string(&store).unwrap();
    assert_eq!(
        content,
        "category,frequency\nRED,3\nPURPLE,2\nBLUE,2\nGREEN,1\n"
    );
}

#[test]
fn test_analyze_debug_logs_to_stderr() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.arg("--debug").arg("analyze").arg("--sample");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("starting analysis"))
        .stdout(predicate::str::contains("starting analysis").not());
}

#[test]
fn test_analyze_store_reruns_with_multiline_category() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("obs.json");
    let store = tmp_dir.path().join("freq.csv");
    fs::write(&input, r#"{"MONDAY": ["DARK\nBLUE", "RED", "RED"]}"#).unwrap();

    let mut contents = Vec::new();
    for _ in 0..2 {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
        cmd.arg("analyze").arg("--input").arg(&input).arg("--store").arg(&store);
        cmd.assert().success();
        contents.push(fs::read_to_string(&store).unwrap());
    }

    assert_eq!(contents[0], "category,frequency\n\"DARK\nBLUE\",1\nRED,2\n");
    assert_eq!(contents[0], contents[1]);
}

#[test]
fn test_analyze_store_dash_prints_frequencies() {
    let tmp_dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catstat");
    cmd.current_dir(tmp_dir.path())
        .arg("analyze")
        .arg("--input")
        .arg(fixture("observations.json"))
        .arg("--store")
        .arg("-");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Mode:"))
        .stdout(predicate::str::contains("RED: 3\nBLUE: 2\nGREEN: 1\n"));
    assert!(!tmp_dir.path().join("-").exists());
}
