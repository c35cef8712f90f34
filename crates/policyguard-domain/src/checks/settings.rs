use super::utils::{Emitter, contains_ci};
use crate::extract::{ValueKind, lookup, string_items};
use crate::model::{RepoModel, SourceDoc};
use crate::policy::EffectiveConfig;
use crate::schema::{KeyViolation, SETTINGS_KEYS, validate_keys};
use policyguard_types::{Finding, ids};
use serde_json::{Value, json};
use std::collections::BTreeSet;

const WHAT: &str = "settings document";

pub const REQUIRED_DOMAINS: &[&str] = &["github.com"];

pub const SENSITIVE_PATH_DENIALS: &[&str] = &[
    "Read(~/.ssh)",
    "Read(~/.ssh/**)",
    "Read(~/.aws)",
    "Read(~/.aws/**)",
    "Edit(~/.ssh/**)",
    "Edit(~/.aws/**)",
];

pub const DANGEROUS_COMMAND_DENIALS: &[&str] = &[
    "Bash(rm -rf *)",
    "Bash(git push --force *)",
    "Bash(git push -f *)",
    "Bash(git push origin main)",
    "Bash(git push origin master)",
];

pub const PACKAGE_MANAGER_TOKEN: &str = "pip";
pub const MIN_PACKAGE_DENIALS: usize = 4;

pub fn run(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let doc = &model.settings;
    schema(doc, cfg, out);
    shape(doc, cfg, out);
    sandbox(doc, cfg, out);
    network_allowlist(doc, cfg, out);
    deny_rules(
        doc,
        cfg,
        out,
        ids::CHECK_SETTINGS_DENY_SENSITIVE_PATHS,
        SENSITIVE_PATH_DENIALS,
    );
    deny_rules(
        doc,
        cfg,
        out,
        ids::CHECK_SETTINGS_DENY_DANGEROUS_COMMANDS,
        DANGEROUS_COMMAND_DENIALS,
    );
    package_denials(doc, cfg, out);
    permission_overlap(doc, cfg, out);
}

/// The settings document parsed as a JSON object, or the document failure finding.
fn settings_json(em: &mut Emitter<'_>, doc: &SourceDoc) -> Option<Value> {
    let text = em.require_text(doc, WHAT)?;
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => Some(value),
        Ok(value) => {
            em.malformed(
                doc,
                WHAT,
                format!(
                    "expected a JSON object, found {}",
                    ValueKind::of(&value).as_str()
                ),
            );
            None
        }
        Err(err) => {
            em.malformed(doc, WHAT, err.to_string());
            None
        }
    }
}

fn schema(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_SCHEMA, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    if lookup(&settings, "$schema").is_none() {
        em.finding(
            ids::CODE_MISSING_SCHEMA,
            &doc.path,
            "$schema",
            format!("{WHAT} '{}' has no '$schema' key", doc.path),
        )
        .emit();
    }
}

fn shape(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_SHAPE, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    for violation in validate_keys(&settings, SETTINGS_KEYS) {
        match violation {
            KeyViolation::Missing { path } => em
                .finding(
                    ids::CODE_MISSING_KEY,
                    &doc.path,
                    path,
                    format!("{WHAT} '{}' is missing required key '{path}'", doc.path),
                )
                .emit(),
            KeyViolation::WrongType {
                path,
                expected,
                found,
            } => em
                .finding(
                    ids::CODE_WRONG_TYPE,
                    &doc.path,
                    path,
                    format!(
                        "{WHAT} '{}': '{path}' must be {expected}, found {}",
                        doc.path,
                        found.as_str()
                    ),
                )
                .data("expected", expected)
                .data("found", found.as_str())
                .emit(),
            KeyViolation::InvalidValue {
                path,
                allowed,
                found,
            } => em
                .finding(
                    ids::CODE_INVALID_VALUE,
                    &doc.path,
                    path,
                    format!(
                        "{WHAT} '{}': '{path}' must be one of {}, found {found}",
                        doc.path,
                        allowed.join(", ")
                    ),
                )
                .data("allowed", json!(allowed))
                .data("found", found)
                .emit(),
        }
    }
}

fn sandbox(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_SANDBOX, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    // Only literal booleans count; "true" or 1 do not enable the sandbox.
    let enabled = lookup(&settings, "sandbox.enabled");
    if enabled != Some(&Value::Bool(true)) {
        em.finding(
            ids::CODE_SANDBOX_DISABLED,
            &doc.path,
            "sandbox.enabled",
            format!("{WHAT} '{}': 'sandbox.enabled' must be true", doc.path),
        )
        .data("found", enabled.cloned().unwrap_or(Value::Null))
        .emit();
    }

    let unsandboxed = lookup(&settings, "sandbox.allowUnsandboxedCommands");
    if unsandboxed != Some(&Value::Bool(false)) {
        em.finding(
            ids::CODE_UNSANDBOXED_COMMANDS_ALLOWED,
            &doc.path,
            "sandbox.allowUnsandboxedCommands",
            format!(
                "{WHAT} '{}': 'sandbox.allowUnsandboxedCommands' must be false",
                doc.path
            ),
        )
        .data("found", unsandboxed.cloned().unwrap_or(Value::Null))
        .emit();
    }
}

fn network_allowlist(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_NETWORK_ALLOWLIST, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    let domains = string_items(lookup(&settings, "sandbox.network.allowedDomains"));
    if domains.is_empty() {
        em.finding(
            ids::CODE_EMPTY_ALLOWLIST,
            &doc.path,
            "sandbox.network.allowedDomains",
            format!(
                "{WHAT} '{}': 'sandbox.network.allowedDomains' is empty",
                doc.path
            ),
        )
        .emit();
    }

    for required in REQUIRED_DOMAINS {
        if !domains.contains(required) {
            em.finding(
                ids::CODE_MISSING_REQUIRED_DOMAIN,
                &doc.path,
                *required,
                format!(
                    "{WHAT} '{}': network allowlist does not include '{required}'",
                    doc.path
                ),
            )
            .data("allowed_domains", json!(domains))
            .emit();
        }
    }
}

fn deny_rules(
    doc: &SourceDoc,
    cfg: &EffectiveConfig,
    out: &mut Vec<Finding>,
    check_id: &'static str,
    required: &[&str],
) {
    let Some(mut em) = Emitter::new(cfg, check_id, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    let deny: BTreeSet<&str> = string_items(lookup(&settings, "permissions.deny"))
        .into_iter()
        .collect();
    for rule in required.iter().filter(|r| !deny.contains(*r)) {
        em.finding(
            ids::CODE_MISSING_DENY_RULE,
            &doc.path,
            *rule,
            format!(
                "{WHAT} '{}': 'permissions.deny' is missing '{rule}'",
                doc.path
            ),
        )
        .emit();
    }
}

fn package_denials(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_DENY_PACKAGE_INSTALLS, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    let matching: Vec<&str> = string_items(lookup(&settings, "permissions.deny"))
        .into_iter()
        .filter(|rule| contains_ci(rule, PACKAGE_MANAGER_TOKEN))
        .collect();
    if matching.len() < MIN_PACKAGE_DENIALS {
        em.finding(
            ids::CODE_INSUFFICIENT_PACKAGE_DENIALS,
            &doc.path,
            PACKAGE_MANAGER_TOKEN,
            format!(
                "{WHAT} '{}': {} deny rules mention '{PACKAGE_MANAGER_TOKEN}', at least {MIN_PACKAGE_DENIALS} required",
                doc.path,
                matching.len()
            ),
        )
        .data("found", json!(matching))
        .data("required", MIN_PACKAGE_DENIALS)
        .emit();
    }
}

fn permission_overlap(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_SETTINGS_PERMISSION_OVERLAP, out) else {
        return;
    };
    let Some(settings) = settings_json(&mut em, doc) else {
        return;
    };

    for rule in overlapping_rules(&settings) {
        em.finding(
            ids::CODE_ALLOW_DENY_OVERLAP,
            &doc.path,
            rule,
            format!(
                "{WHAT} '{}': '{rule}' appears in both 'permissions.allow' and 'permissions.deny'",
                doc.path
            ),
        )
        .emit();
    }
}

/// Rules present in both `permissions.allow` and `permissions.deny`, sorted.
pub(crate) fn overlapping_rules(root: &Value) -> Vec<&str> {
    let allow: BTreeSet<&str> = string_items(lookup(root, "permissions.allow"))
        .into_iter()
        .collect();
    let deny: BTreeSet<&str> = string_items(lookup(root, "permissions.deny"))
        .into_iter()
        .collect();
    allow.intersection(&deny).copied().collect()
}
