//! Developer tasks (schema generation, report conformance, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use camino::Utf8Path;
use policyguard_app::{CheckInput, run_check};
use policyguard_settings::Overrides;
use policyguard_test_util::{normalize_nondeterministic, scaffold};
use schemars::schema_for;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Project root (parent of the xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("cannot determine current directory")?,
    };

    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(manifest_dir)
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(policyguard_types::PolicyguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(policyguard_settings::PolicyguardConfigV1)
}

fn schema_specs() -> [SchemaSpec; 2] {
    [
        SchemaSpec {
            filename: "policyguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "policyguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Fails when a checked-in schema is missing or differs from the generated one.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    for name in &missing {
        eprintln!("missing schema: {name}");
    }
    for name in &mismatched {
        eprintln!("schema out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate generated reports against the report schema");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
}

/// Verdict reasons are dotted check ids or snake_case tokens.
fn is_valid_reason(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
}

/// No absolute paths, no `..`, forward slashes only.
fn is_clean_path(path: &str) -> bool {
    !(path.starts_with('/')
        || path.contains("..")
        || path.contains('\\')
        || (path.len() >= 2 && path.as_bytes()[1] == b':'))
}

fn report_for(root: &Path, config_text: &str) -> anyhow::Result<Value> {
    let repo_root = Utf8Path::from_path(root).context("temp dir is not UTF-8")?;
    let output = run_check(CheckInput {
        repo_root,
        config_text,
        overrides: Overrides::default(),
    })?;
    serde_json::to_value(&output.report).context("serialize report")
}

fn conformance_errors(label: &str, validator: &jsonschema::Validator, report: &Value) -> Vec<String> {
    let mut errors: Vec<String> = validator
        .iter_errors(report)
        .map(|e| format!("{label}: schema: {e}"))
        .collect();

    for reason in report["verdict"]["reasons"].as_array().into_iter().flatten() {
        let reason = reason.as_str().unwrap_or_default();
        if !is_valid_reason(reason) {
            errors.push(format!("{label}: bad verdict reason '{reason}'"));
        }
    }
    for finding in report["findings"].as_array().into_iter().flatten() {
        if let Some(path) = finding["location"]["path"].as_str()
            && !is_clean_path(path)
        {
            errors.push(format!("{label}: unclean path '{path}'"));
        }
    }
    errors
}

/// Runs the checker in-process over scaffolded repositories and validates each
/// report against the checked-in schema, path hygiene, and determinism.
fn conform() -> anyhow::Result<()> {
    let schema_path = schemas_dir()?.join("policyguard.report.v1.json");
    let schema_text = fs::read_to_string(&schema_path).with_context(|| {
        format!(
            "failed to read {} (run `cargo xtask emit-schemas`)",
            schema_path.display()
        )
    })?;
    let schema: Value = serde_json::from_str(&schema_text).context("schema is not JSON")?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("failed to compile schema: {e}"))?;
    println!("✓ policyguard.report.v1.json compiles");

    let compliant = tempfile::tempdir().context("create temp dir")?;
    scaffold::write_compliant_repo(compliant.path()).context("scaffold compliant repo")?;
    let empty = tempfile::tempdir().context("create temp dir")?;

    let mut errors = Vec::new();
    let cases = [
        ("compliant", compliant.path(), ""),
        ("empty", empty.path(), ""),
        ("warn-profile", empty.path(), "profile = \"warn\"\n"),
    ];
    for (label, root, config) in cases {
        let first = report_for(root, config)?;
        errors.extend(conformance_errors(label, &validator, &first));

        let second = report_for(root, config)?;
        if normalize_nondeterministic(first) != normalize_nondeterministic(second) {
            errors.push(format!("{label}: report differs between runs"));
        }
        println!("✓ {label} report checked");
    }

    let runtime = serde_json::to_value(policyguard_app::runtime_error_report("boom"))
        .context("serialize runtime error report")?;
    errors.extend(conformance_errors("runtime-error", &validator, &runtime));

    if errors.is_empty() {
        println!("\n✓ All conformance checks passed!");
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("conformance failed with {} errors", errors.len())
}

fn explain_coverage() -> anyhow::Result<()> {
    let check_ids = policyguard_types::explain::all_check_ids();
    let codes = policyguard_types::explain::all_codes();
    let mut errors = Vec::new();

    for (kind, id) in check_ids
        .iter()
        .map(|id| ("check ID", *id))
        .chain(codes.iter().map(|code| ("code", *code)))
    {
        match policyguard_types::explain::lookup_explanation(id) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty remediation"));
                }
            }
            None => errors.push(format!("{kind} '{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} check IDs have explanations", check_ids.len());
        println!("✓ {} codes have explanations", codes.len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("explain coverage failed with {} errors", errors.len())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
