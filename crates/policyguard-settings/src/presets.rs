use policyguard_domain::policy::{CheckPolicy, EffectiveConfig, FailOn};
use policyguard_types::explain::all_check_ids;
use policyguard_types::{Severity, ids};
use std::collections::BTreeMap;

pub const PROFILES: &[&str] = &["strict", "warn", "compat"];

/// Checks that stay errors under `compat`.
const COMPAT_ERRORS: &[&str] = &[
    ids::CHECK_SETTINGS_SANDBOX,
    ids::CHECK_SETTINGS_DENY_SENSITIVE_PATHS,
    ids::CHECK_SETTINGS_DENY_DANGEROUS_COMMANDS,
    ids::CHECK_SETTINGS_DENY_PACKAGE_INSTALLS,
    ids::CHECK_OWNERSHIP_SELF_PROTECTION,
    ids::CHECK_WORKFLOWS_PINNED_ACTIONS,
];

/// Preset profiles are opinionated defaults; `None` for an unknown name.
pub fn preset(profile: &str) -> Option<EffectiveConfig> {
    match profile {
        "strict" => Some(strict_profile()),
        "warn" => Some(warn_profile()),
        "compat" => Some(compat_profile()),
        _ => None,
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        checks: all_checks(|_| Severity::Error),
    }
}

fn warn_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "warn".to_string(),
        fail_on: FailOn::Warning,
        max_findings: 200,
        checks: all_checks(|_| Severity::Warning),
    }
}

fn compat_profile() -> EffectiveConfig {
    // Adoption mode: everything reports, only the core safety rails block.
    EffectiveConfig {
        profile: "compat".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        checks: all_checks(|id| {
            if COMPAT_ERRORS.contains(&id) {
                Severity::Error
            } else {
                Severity::Warning
            }
        }),
    }
}

fn all_checks(severity: impl Fn(&str) -> Severity) -> BTreeMap<String, CheckPolicy> {
    all_check_ids()
        .iter()
        .map(|id| (id.to_string(), CheckPolicy::enabled(severity(*id))))
        .collect()
}
