use crate::checks;
use crate::model::RepoModel;
use crate::policy::{EffectiveConfig, FailOn};
use crate::report::{DomainReport, SeverityCounts, check_statuses};
use policyguard_types::explain::all_check_ids;
use policyguard_types::{CheckStatus, Finding, PolicyguardData, Severity, VerdictStatus};

pub fn evaluate(model: &RepoModel, cfg: &EffectiveConfig) -> DomainReport {
    let mut findings: Vec<Finding> = Vec::new();

    checks::run_all(model, cfg, &mut findings);

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    // Per-check outcomes reflect every finding, including truncated ones.
    let statuses = check_statuses(
        all_check_ids().iter().copied(),
        |id| cfg.check_policy(id).is_some(),
        &findings,
    );
    let checks_run = statuses
        .values()
        .filter(|s| **s != CheckStatus::Skip)
        .count() as u32;

    let total = findings.len() as u32;
    // Verdict and counts cover every finding, not only the emitted prefix.
    let verdict = compute_verdict(&findings, cfg.fail_on);
    let counts = SeverityCounts::from_findings(&findings);

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let data = PolicyguardData {
        profile: cfg.profile.clone(),
        documents_scanned: model.documents_scanned(),
        checks_run,
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
        checks: statuses,
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
        counts,
    }
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> VerdictStatus {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return VerdictStatus::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => VerdictStatus::Fail,
            FailOn::Error => VerdictStatus::Warn,
        };
    }

    VerdictStatus::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) location.path (missing last)
    // 3) location.line (missing last)
    // 4) check_id
    // 5) code
    // 6) message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let key = |f: &Finding| match &f.location {
        Some(l) => (l.path.as_str().to_string(), l.line.unwrap_or(u32::MAX)),
        None => ("~".to_string(), u32::MAX),
    };
    let (ap, al) = key(a);
    let (bp, bl) = key(b);

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(&bp))
        .then(al.cmp(&bl))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceDoc;
    use crate::policy::CheckPolicy;
    use crate::test_support::{compliant_model, config_all, config_with_check};
    use policyguard_types::ids;

    #[test]
    fn compliant_repository_passes_every_check() {
        let report = evaluate(&compliant_model(), &config_all(Severity::Error));
        assert!(report.findings.is_empty(), "{:#?}", report.findings);
        assert_eq!(report.verdict, VerdictStatus::Pass);
        assert_eq!(report.data.checks_run, all_check_ids().len() as u32);
        assert!(report.data.checks.values().all(|s| *s == CheckStatus::Pass));
        assert_eq!(report.data.documents_scanned, 7);
    }

    #[test]
    fn verdict_warn_becomes_fail_when_fail_on_warning() {
        let mut model = compliant_model();
        model.ownership = SourceDoc::loaded("CODEOWNERS", "* @team\n");

        let mut cfg = config_with_check(ids::CHECK_OWNERSHIP_SELF_PROTECTION, Severity::Warning);
        assert_eq!(evaluate(&model, &cfg).verdict, VerdictStatus::Warn);

        cfg.fail_on = FailOn::Warning;
        assert_eq!(evaluate(&model, &cfg).verdict, VerdictStatus::Fail);
    }

    #[test]
    fn disabled_checks_are_skipped_and_not_counted() {
        let mut model = compliant_model();
        model.guidance = SourceDoc::missing("CLAUDE.md");

        let mut cfg = config_all(Severity::Error);
        cfg.checks.insert(
            ids::CHECK_GUIDANCE_REQUIRED_PHRASES.to_string(),
            CheckPolicy::disabled(),
        );
        cfg.checks.insert(
            ids::CHECK_REPO_REQUIRED_FILES.to_string(),
            CheckPolicy::disabled(),
        );

        let report = evaluate(&model, &cfg);
        assert_eq!(report.verdict, VerdictStatus::Pass);
        assert_eq!(
            report.check_status(ids::CHECK_GUIDANCE_REQUIRED_PHRASES),
            Some(CheckStatus::Skip)
        );
        assert_eq!(report.data.checks_run, all_check_ids().len() as u32 - 2);
    }

    #[test]
    fn truncation_keeps_statuses_and_totals() {
        let mut model = compliant_model();
        model.settings = SourceDoc::loaded(".claude/settings.json", "{}");

        let mut cfg = config_all(Severity::Error);
        cfg.max_findings = 1;

        let report = evaluate(&model, &cfg);
        assert_eq!(report.findings.len(), 1);
        assert!(report.data.findings_total > 1);
        assert_eq!(report.data.findings_emitted, 1);
        assert!(report.data.truncated_reason.is_some());
        assert_eq!(
            report.check_status(ids::CHECK_SETTINGS_SANDBOX),
            Some(CheckStatus::Fail)
        );
        assert!(report.failed_checks().len() > 1);
    }

    #[test]
    fn truncated_errors_still_fail_the_verdict() {
        let mut model = compliant_model();
        model.ownership = SourceDoc::loaded("CODEOWNERS", "* @team\n");
        model.settings = SourceDoc::loaded(".claude/settings.json", "{}");

        let mut cfg = config_all(Severity::Error);
        cfg.checks.insert(
            ids::CHECK_OWNERSHIP_SELF_PROTECTION.to_string(),
            CheckPolicy::enabled(Severity::Warning),
        );
        cfg.max_findings = 1;

        let report = evaluate(&model, &cfg);
        assert_eq!(report.verdict, VerdictStatus::Fail);
        assert_eq!(report.findings.len(), 1);
        assert!(report.counts.error > 1, "{:?}", report.counts);
        assert!(report.counts.warning > 0, "{:?}", report.counts);
        assert_eq!(
            report.counts.error + report.counts.warning + report.counts.info,
            report.data.findings_total
        );
    }

    #[test]
    fn findings_are_sorted_by_severity_then_location() {
        let mut model = compliant_model();
        model.ownership = SourceDoc::loaded("CODEOWNERS", "* @team\n");
        model.settings = SourceDoc::loaded(".claude/settings.json", "[]");

        let mut cfg = config_all(Severity::Error);
        cfg.checks.insert(
            ids::CHECK_OWNERSHIP_SELF_PROTECTION.to_string(),
            CheckPolicy::enabled(Severity::Warning),
        );

        let report = evaluate(&model, &cfg);
        let first_warning = report
            .findings
            .iter()
            .position(|f| f.severity == Severity::Warning)
            .expect("warning");
        assert!(report.findings[..first_warning]
            .iter()
            .all(|f| f.severity == Severity::Error));
        let error_paths: Vec<&str> = report.findings[..first_warning]
            .iter()
            .filter_map(|f| f.location.as_ref().map(|l| l.path.as_str()))
            .collect();
        let mut sorted = error_paths.clone();
        sorted.sort();
        assert_eq!(error_paths, sorted);
    }
}
