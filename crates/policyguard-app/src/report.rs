use anyhow::Context;
use policyguard_render::{
    RenderableCheckStatus, RenderableData, RenderableFinding, RenderableLocation,
    RenderableReport, RenderableSeverity, RenderableVerdictStatus,
};
use policyguard_types::{
    CheckStatus, Finding, PolicyguardData, PolicyguardReport, ReportEnvelope, RunMeta,
    SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict, VerdictCounts, VerdictStatus, ids,
};
use time::OffsetDateTime;

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "policyguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub fn parse_report_json(text: &str) -> anyhow::Result<PolicyguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse policyguard report")
}

pub fn serialize_report(report: &PolicyguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &PolicyguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict.status {
            VerdictStatus::Pass => RenderableVerdictStatus::Pass,
            VerdictStatus::Warn => RenderableVerdictStatus::Warn,
            VerdictStatus::Fail => RenderableVerdictStatus::Fail,
        },
        findings: report.findings.iter().map(renderable_finding).collect(),
        data: RenderableData {
            profile: report.data.profile.clone(),
            documents_scanned: report.data.documents_scanned,
            findings_emitted: report.data.findings_emitted,
            findings_total: report.data.findings_total,
            truncated_reason: report.data.truncated_reason.clone(),
            checks: report
                .data
                .checks
                .iter()
                .map(|(id, status)| {
                    let status = match status {
                        CheckStatus::Pass => RenderableCheckStatus::Pass,
                        CheckStatus::Warn => RenderableCheckStatus::Warn,
                        CheckStatus::Fail => RenderableCheckStatus::Fail,
                        CheckStatus::Skip => RenderableCheckStatus::Skip,
                    };
                    (id.clone(), status)
                })
                .collect(),
        },
    }
}

fn renderable_finding(f: &Finding) -> RenderableFinding {
    RenderableFinding {
        severity: match f.severity {
            Severity::Info => RenderableSeverity::Info,
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        check_id: f.check_id.clone(),
        code: f.code.clone(),
        message: f.message.clone(),
        location: f.location.as_ref().map(|loc| RenderableLocation {
            path: loc.path.as_str().to_string(),
            line: loc.line,
        }),
        help: f.help.clone(),
    }
}

/// Report written when the tool itself fails (bad config, unreadable root, ...).
pub fn runtime_error_report(message: &str) -> PolicyguardReport {
    let now = OffsetDateTime::now_utc();
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
        },
        verdict: Verdict {
            status: VerdictStatus::Fail,
            counts: VerdictCounts {
                info: 0,
                warn: 0,
                error: 1,
            },
            reasons: vec!["tool_error".to_string()],
        },
        findings: vec![Finding {
            severity: Severity::Error,
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            location: None,
            help: Some("Fix the tool error and re-run policyguard.".to_string()),
            url: None,
            fingerprint: None,
            data: serde_json::Value::Null,
        }],
        data: PolicyguardData {
            profile: "unknown".to_string(),
            findings_total: 1,
            findings_emitted: 1,
            ..PolicyguardData::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_report_survives_serialization() {
        let report = runtime_error_report("parse config: expected `=`");
        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        let parsed = parse_report_json(&text).expect("parse");

        assert_eq!(parsed.verdict.status, VerdictStatus::Fail);
        assert_eq!(parsed.findings.len(), 1);
        assert_eq!(parsed.findings[0].check_id, ids::CHECK_TOOL_RUNTIME);
        assert_eq!(parsed.findings[0].message, "parse config: expected `=`");
        assert_eq!(parsed.tool.name, "policyguard");
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let err = parse_report_json(r#"{"schema":"policyguard.report.v9"}"#).expect_err("schema");
        assert!(err.to_string().contains("unknown report schema"));
        assert!(parse_report_json("not json").is_err());
    }

    #[test]
    fn renderable_keeps_check_outcomes() {
        let mut report = runtime_error_report("boom");
        report
            .data
            .checks
            .insert("settings.sandbox".to_string(), CheckStatus::Skip);
        let r = to_renderable(&report);
        assert_eq!(r.verdict, RenderableVerdictStatus::Fail);
        assert_eq!(
            r.data.checks,
            vec![("settings.sandbox".to_string(), RenderableCheckStatus::Skip)]
        );
        assert_eq!(r.findings[0].code, ids::CODE_RUNTIME_ERROR);
    }
}
