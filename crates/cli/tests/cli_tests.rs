//! CLI integration tests

use std::io::Write;
use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "finops-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Cloud Cost Governance"),
        "Should show app name"
    );
    assert!(stdout.contains("allocate"), "Should show allocate command");
    assert!(stdout.contains("showback"), "Should show showback command");
    assert!(stdout.contains("compliance"), "Should show compliance command");
    assert!(stdout.contains("anomaly"), "Should show anomaly command");
    assert!(stdout.contains("reservation"), "Should show reservation command");
    assert!(stdout.contains("waste"), "Should show waste command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "finops-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("finops"), "Should show binary name");
}

/// Test allocate subcommand help
#[test]
fn test_allocate_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "finops-cli", "--", "allocate", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Allocate help should succeed");
    assert!(stdout.contains("--resources"), "Should show resources option");
    assert!(stdout.contains("--shared"), "Should show shared option");
    assert!(stdout.contains("--rules"), "Should show rules option");
}

/// Test anomaly detect subcommand help
#[test]
fn test_anomaly_detect_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "finops-cli", "--", "anomaly", "detect", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Anomaly detect help should succeed");
    assert!(
        stdout.contains("--rolling-threshold"),
        "Should show rolling threshold option"
    );
    assert!(
        stdout.contains("--dod-threshold"),
        "Should show day-over-day threshold option"
    );
}

/// Test waste scan subcommand help
#[test]
fn test_waste_scan_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "finops-cli", "--", "waste", "scan", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Waste scan help should succeed");
    assert!(
        stdout.contains("--thresholds"),
        "Should show thresholds option"
    );
}

/// End-to-end allocation over temp files: direct totals, quarantine,
/// shared distribution, and the zero-leakage result
#[test]
fn test_allocate_end_to_end() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let resources_path = dir.path().join("resources.json");
    let shared_path = dir.path().join("shared.json");
    let rules_path = dir.path().join("rules.json");
    let out_path = dir.path().join("allocation.json");

    write!(
        std::fs::File::create(&resources_path).unwrap(),
        r#"{{"resources": [
            {{"name": "api-vm", "monthly_cost": 60.0, "tags": {{"CostCenter": "Eng"}}}},
            {{"name": "build-vm", "monthly_cost": 40.0, "tags": {{"CostCenter": "Eng"}}}},
            {{"name": "stray-disk", "monthly_cost": 10.0}}
        ]}}"#
    )
    .unwrap();
    write!(
        std::fs::File::create(&shared_path).unwrap(),
        r#"{{"shared_resources": [
            {{"name": "gateway", "monthly_cost": 20.0, "allocation_rule": "split-equal"}},
            {{"name": "mystery", "monthly_cost": 5.0, "allocation_rule": "no-such-rule"}}
        ]}}"#
    )
    .unwrap();
    write!(
        std::fs::File::create(&rules_path).unwrap(),
        r#"{{"rules": [{{"name": "split-equal", "method": "equal"}}]}}"#
    )
    .unwrap();

    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "finops-cli",
            "--",
            "--format",
            "json",
            "allocate",
            "--resources",
            resources_path.to_str().unwrap(),
            "--shared",
            shared_path.to_str().unwrap(),
            "--rules",
            rules_path.to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Allocation should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();

    assert_eq!(report["direct"]["by_cost_center"]["Eng"]["direct"], 100.0);
    assert_eq!(report["direct"]["untagged"]["total"], 10.0);
    assert_eq!(
        report["shared_distributions"]["gateway"]["allocation"]["Eng"],
        20.0
    );
    assert!(report["shared_distributions"]["mystery"]["error"]
        .as_str()
        .unwrap()
        .contains("no-such-rule"));
    assert_eq!(report["fully_loaded"]["cost_centers"]["Eng"]["total"], 120.0);
    assert_eq!(report["fully_loaded"]["grand_total"], 130.0);
    assert_eq!(report["fully_loaded"]["leakage"], 0.0);
}

/// Identical inputs must produce byte-identical saved reports
#[test]
fn test_allocate_is_idempotent() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let resources_path = dir.path().join("resources.json");
    let shared_path = dir.path().join("shared.json");
    let rules_path = dir.path().join("rules.json");

    write!(
        std::fs::File::create(&resources_path).unwrap(),
        r#"{{"resources": [
            {{"name": "a", "monthly_cost": 31.07, "tags": {{"CostCenter": "Eng"}}}},
            {{"name": "b", "monthly_cost": 18.93, "tags": {{"CostCenter": "Data"}}}}
        ]}}"#
    )
    .unwrap();
    write!(
        std::fs::File::create(&shared_path).unwrap(),
        r#"{{"shared_resources": [
            {{"name": "nat", "monthly_cost": 100.0, "allocation_rule": "thirds",
              "allocation_weights": {{"Eng": 1.0, "Data": 1.0, "Ops": 1.0}}}}
        ]}}"#
    )
    .unwrap();
    write!(
        std::fs::File::create(&rules_path).unwrap(),
        r#"{{"rules": [{{"name": "thirds", "method": "proportional"}}]}}"#
    )
    .unwrap();

    let run = |out: &std::path::Path| {
        let output = Command::new("cargo")
            .args([
                "run",
                "-p",
                "finops-cli",
                "--",
                "--as-of",
                "2026-02-01",
                "allocate",
                "--resources",
                resources_path.to_str().unwrap(),
                "--shared",
                shared_path.to_str().unwrap(),
                "--rules",
                rules_path.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
            ])
            .output()
            .expect("Failed to execute command");
        assert!(output.status.success());
        std::fs::read(out).unwrap()
    };

    let first = run(&dir.path().join("first.json"));
    let second = run(&dir.path().join("second.json"));
    assert_eq!(first, second);
}
