//! The `check` use case: evaluate policy and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use policyguard_domain::report::DomainReport;
use policyguard_settings::{Overrides, PolicyguardConfigV1, ResolvedConfig};
use policyguard_types::{
    PolicyguardReport, ReportEnvelope, RunMeta, SCHEMA_REPORT_V1, Verdict, VerdictCounts,
    VerdictStatus,
};
use time::OffsetDateTime;

use crate::report::tool_meta;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    pub repo_root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
}

#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: PolicyguardReport,
    pub resolved_config: ResolvedConfig,
}

/// Parse config, load the documents, evaluate every check, and assemble the report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Empty is allowed, defaults apply.
    let cfg = if input.config_text.trim().is_empty() {
        PolicyguardConfigV1::default()
    } else {
        policyguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved =
        policyguard_settings::resolve_config(cfg, input.overrides).context("resolve config")?;
    tracing::debug!(
        profile = %resolved.effective.profile,
        max_findings = resolved.effective.max_findings,
        "resolved config"
    );

    let model = policyguard_repo::build_repo_model(input.repo_root, &resolved.paths)
        .context("load repository documents")?;

    let domain_report = policyguard_domain::evaluate(&model, &resolved.effective);
    let reasons = domain_report
        .failed_checks()
        .into_iter()
        .map(str::to_string)
        .collect();
    let DomainReport {
        verdict: status,
        findings,
        data,
        counts,
    } = domain_report;

    let ended_at = OffsetDateTime::now_utc();
    let duration_ms = (ended_at - started_at).whole_milliseconds().max(0) as u64;

    tracing::info!(
        verdict = ?status,
        errors = counts.error,
        warnings = counts.warning,
        checks_run = data.checks_run,
        duration_ms,
        "policy evaluation finished"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at,
            ended_at: Some(ended_at),
            duration_ms: Some(duration_ms),
        },
        verdict: Verdict {
            status,
            counts: VerdictCounts {
                info: counts.info,
                warn: counts.warning,
                error: counts.error,
            },
            reasons,
        },
        findings,
        data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(status: VerdictStatus) -> i32 {
    match status {
        VerdictStatus::Pass | VerdictStatus::Warn => 0,
        VerdictStatus::Fail => 2,
    }
}
