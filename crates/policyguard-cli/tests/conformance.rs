//! Conformance tests for policyguard.
//!
//! These tests validate:
//! 1. Every check ID and code has an explanation
//! 2. IDs follow the dotted / snake_case conventions
//! 3. Reports produced by the binary validate against the generated report schema

use assert_cmd::Command;
use policyguard_test_util::scaffold;
use policyguard_types::{PolicyguardReport, explain, ids};
use serde_json::Value;
use tempfile::TempDir;

#[allow(deprecated)]
fn policyguard_cmd() -> Command {
    Command::cargo_bin("policyguard").expect("policyguard binary not found")
}

// =============================================================================
// Explanation coverage
// =============================================================================

#[test]
fn all_check_ids_and_codes_have_explanations() {
    for id in explain::all_check_ids().iter().chain(explain::all_codes()) {
        let exp = explain::lookup_explanation(id)
            .unwrap_or_else(|| panic!("'{id}' has no explanation in registry"));
        assert!(!exp.title.is_empty(), "'{id}' has empty title");
        assert!(!exp.description.is_empty(), "'{id}' has empty description");
        assert!(!exp.remediation.is_empty(), "'{id}' has empty remediation");
        assert!(!exp.examples.before.is_empty(), "'{id}' has no failing example");
        assert!(!exp.examples.after.is_empty(), "'{id}' has no passing example");
    }
}

#[test]
fn check_ids_and_codes_are_consistent() {
    for check_id in explain::all_check_ids() {
        let (namespace, name) = check_id
            .split_once('.')
            .unwrap_or_else(|| panic!("check ID '{check_id}' should be dotted"));
        assert!(
            ["repo", "settings", "ownership", "guidance", "workflows", "docs"].contains(&namespace),
            "check ID '{check_id}' has an unknown namespace"
        );
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
    }

    for code in explain::all_codes() {
        assert!(
            code.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
            "code '{code}' should be snake_case"
        );
    }
}

#[test]
fn catalog_has_no_duplicates() {
    let mut ids = explain::all_check_ids().to_vec();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), explain::all_check_ids().len());
    assert!(!ids.contains(&ids::CHECK_TOOL_RUNTIME));
}

// =============================================================================
// Report schema conformance
// =============================================================================

fn report_validator() -> jsonschema::Validator {
    let schema = schemars::schema_for!(PolicyguardReport);
    let schema_value = serde_json::to_value(&schema).expect("schema to json");
    jsonschema::validator_for(&schema_value).expect("report schema compiles")
}

fn run_check(root: &std::path::Path) -> Value {
    let out = root.join("report.json");
    policyguard_cmd()
        .arg("--repo-root")
        .arg(root)
        .args(["check", "--quiet", "--report-out"])
        .arg(&out)
        .output()
        .expect("run policyguard");
    serde_json::from_str(&std::fs::read_to_string(&out).expect("report")).expect("json")
}

fn assert_valid(validator: &jsonschema::Validator, report: &Value, label: &str) {
    let errors: Vec<String> = validator
        .iter_errors(report)
        .map(|e| e.to_string())
        .collect();
    assert!(errors.is_empty(), "{label} report violates schema: {errors:#?}");
}

#[test]
fn passing_and_failing_reports_match_schema() {
    let validator = report_validator();

    let compliant = TempDir::new().expect("temp dir");
    scaffold::write_compliant_repo(compliant.path()).expect("scaffold");
    assert_valid(&validator, &run_check(compliant.path()), "compliant");

    let empty = TempDir::new().expect("temp dir");
    assert_valid(&validator, &run_check(empty.path()), "empty");
}

#[test]
fn runtime_error_report_matches_schema() {
    let validator = report_validator();
    let repo = TempDir::new().expect("temp dir");
    scaffold::write_file(repo.path(), "policyguard.toml", "profile = \"nope\"\n").expect("write");

    let report = run_check(repo.path());
    assert_eq!(report["findings"][0]["code"], ids::CODE_RUNTIME_ERROR);
    assert_valid(&validator, &report, "runtime error");
}

#[test]
fn finding_paths_are_repo_relative() {
    let repo = TempDir::new().expect("temp dir");
    let report = run_check(repo.path());
    for f in report["findings"].as_array().expect("findings") {
        if let Some(path) = f["location"]["path"].as_str() {
            assert!(!path.starts_with('/'), "absolute path leaked: {path}");
            assert!(!path.contains('\\'), "backslash in path: {path}");
            assert!(!path.contains(".."), "parent traversal in path: {path}");
        }
    }
}
