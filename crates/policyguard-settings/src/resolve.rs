use crate::model::{CONFIG_SCHEMA_V1, PathsConfig, PolicyguardConfigV1};
use crate::presets::{self, PROFILES};
use anyhow::Context;
use globset::Glob;
use policyguard_domain::model::DocumentPaths;
use policyguard_domain::policy::{EffectiveConfig, FailOn};
use policyguard_types::{RepoPath, Severity};

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub max_findings: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    pub paths: DocumentPaths,
}

pub fn resolve_config(
    cfg: PolicyguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != CONFIG_SCHEMA_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {CONFIG_SCHEMA_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected one of {})",
            PROFILES.join(", ")
        )
    })?;

    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        if mf == 0 {
            anyhow::bail!("max_findings must be at least 1");
        }
        effective.max_findings = mf as usize;
    }

    // Per-check overrides. Presets list the whole catalog, so an unknown id is a typo.
    for (check_id, cc) in &cfg.checks {
        let entry = effective
            .checks
            .get_mut(check_id)
            .with_context(|| format!("unknown check_id in [checks]: {check_id}"))?;

        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = cc.severity.as_deref() {
            entry.severity =
                parse_severity(sev).with_context(|| format!("invalid severity for {check_id}"))?;
        }
        if !cc.allow.is_empty() {
            validate_allowlist(check_id, &cc.allow)?;
            entry.allow = cc.allow.clone();
        }
    }

    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }

    Ok(ResolvedConfig {
        effective,
        paths: resolve_paths(&cfg.paths),
    })
}

fn resolve_paths(cfg: &PathsConfig) -> DocumentPaths {
    let mut paths = DocumentPaths::default();
    let pick = |slot: &mut RepoPath, value: &Option<String>| {
        if let Some(v) = value {
            *slot = RepoPath::new(v);
        }
    };
    pick(&mut paths.settings, &cfg.settings);
    pick(&mut paths.ownership, &cfg.ownership);
    pick(&mut paths.guidance, &cfg.guidance);
    pick(&mut paths.tutorial, &cfg.tutorial);
    pick(&mut paths.it_checklist, &cfg.it_checklist);
    pick(&mut paths.pr_workflow, &cfg.pr_workflow);
    pick(&mut paths.scheduled_workflow, &cfg.scheduled_workflow);

    if let Some(scan_all) = cfg.scan_all_workflows {
        paths.scan_all_workflows = scan_all;
    }
    if let Some(layout) = &cfg.layout {
        paths.layout = layout.iter().map(RepoPath::new).collect();
    }
    paths
}

fn validate_allowlist(check_id: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern)
            .with_context(|| format!("invalid allow glob for {check_id}: {pattern}"))?;
    }
    Ok(())
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => anyhow::bail!("unknown severity: {other} (expected info|warning|error)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;
    use policyguard_types::ids;

    #[test]
    fn empty_config_resolves_to_strict_defaults() {
        let resolved = resolve_config(PolicyguardConfigV1::default(), Overrides::default())
            .expect("resolve");
        assert_eq!(resolved.effective.profile, "strict");
        assert_eq!(resolved.effective.max_findings, 200);
        assert_eq!(resolved.paths, DocumentPaths::default());
    }

    #[test]
    fn file_values_and_cli_overrides_layer() {
        let cfg = parse_config_toml(
            r#"
schema = "policyguard.config.v1"
profile = "warn"
fail_on = "error"
max_findings = 50

[paths]
guidance = "docs/AGENTS.md"
scan_all_workflows = true
layout = ["pipelines", "ops"]

[checks."workflows.pinned_actions"]
severity = "error"
allow = ["my-org/*"]

[checks."repo.layout"]
enabled = false
"#,
        )
        .expect("parse");

        let resolved = resolve_config(
            cfg,
            Overrides {
                profile: None,
                max_findings: Some(10),
            },
        )
        .expect("resolve");

        let eff = &resolved.effective;
        assert_eq!(eff.profile, "warn");
        assert_eq!(eff.fail_on, FailOn::Error);
        assert_eq!(eff.max_findings, 10);

        let pins = &eff.checks[ids::CHECK_WORKFLOWS_PINNED_ACTIONS];
        assert_eq!(pins.severity, Severity::Error);
        assert_eq!(pins.allow, vec!["my-org/*".to_string()]);
        assert!(eff.check_policy(ids::CHECK_REPO_LAYOUT).is_none());

        assert_eq!(resolved.paths.guidance.as_str(), "docs/AGENTS.md");
        assert!(resolved.paths.scan_all_workflows);
        assert_eq!(resolved.paths.layout.len(), 2);
        assert_eq!(resolved.paths.settings.as_str(), ".claude/settings.json");
    }

    #[test]
    fn cli_profile_wins_over_file_profile() {
        let cfg = parse_config_toml("profile = \"warn\"\n").expect("parse");
        let resolved = resolve_config(
            cfg,
            Overrides {
                profile: Some("compat".to_string()),
                max_findings: None,
            },
        )
        .expect("resolve");
        assert_eq!(resolved.effective.profile, "compat");
    }

    #[test]
    fn configuration_mistakes_are_errors() {
        let cases = [
            "profile = \"lenient\"\n",
            "fail_on = \"never\"\n",
            "schema = \"policyguard.config.v9\"\n",
            "[checks.\"settings.sandbox\"]\nseverity = \"fatal\"\n",
            "[checks.\"settings.sandbx\"]\nenabled = false\n",
            "[checks.\"workflows.pinned_actions\"]\nallow = [\"[unclosed\"]\n",
            "max_findings = 0\n",
        ];
        for input in cases {
            let cfg = parse_config_toml(input).expect("parse");
            assert!(
                resolve_config(cfg, Overrides::default()).is_err(),
                "expected error for {input:?}"
            );
        }
    }

    #[test]
    fn zero_max_findings_override_is_rejected() {
        let cfg = parse_config_toml("").expect("parse");
        let err = resolve_config(
            cfg,
            Overrides {
                profile: None,
                max_findings: Some(0),
            },
        )
        .expect_err("zero max_findings");
        assert!(err.to_string().contains("max_findings"), "{err}");
    }

    #[test]
    fn malformed_toml_fails_to_parse() {
        assert!(parse_config_toml("max_findings = \"many\"\n").is_err());
        assert!(parse_config_toml("profile = \n").is_err());
    }
}
