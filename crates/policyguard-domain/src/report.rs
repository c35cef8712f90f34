use policyguard_types::{CheckStatus, Finding, PolicyguardData, Severity, VerdictStatus};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub info: u32,
    pub warning: u32,
    pub error: u32,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = SeverityCounts::default();
        for f in findings {
            match f.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }
}

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: VerdictStatus,
    pub findings: Vec<Finding>,
    pub data: PolicyguardData,
    pub counts: SeverityCounts,
}

impl DomainReport {
    pub fn check_status(&self, check_id: &str) -> Option<CheckStatus> {
        self.data.checks.get(check_id).copied()
    }

    pub fn failed_checks(&self) -> Vec<&str> {
        self.data
            .checks
            .iter()
            .filter(|(_, s)| **s == CheckStatus::Fail)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

pub(crate) fn check_statuses<'a>(
    catalog: impl IntoIterator<Item = &'a str>,
    enabled: impl Fn(&str) -> bool,
    findings: &[Finding],
) -> BTreeMap<String, CheckStatus> {
    let mut out = BTreeMap::new();
    for check_id in catalog {
        let status = if !enabled(check_id) {
            CheckStatus::Skip
        } else {
            let worst = findings
                .iter()
                .filter(|f| f.check_id == check_id)
                .map(|f| f.severity)
                .fold(None, |acc: Option<Severity>, s| match (acc, s) {
                    (Some(Severity::Error), _) | (_, Severity::Error) => Some(Severity::Error),
                    (Some(Severity::Warning), _) | (_, Severity::Warning) => Some(Severity::Warning),
                    _ => Some(Severity::Info),
                });
            match worst {
                Some(Severity::Error) => CheckStatus::Fail,
                Some(Severity::Warning) => CheckStatus::Warn,
                Some(Severity::Info) | None => CheckStatus::Pass,
            }
        };
        out.insert(check_id.to_string(), status);
    }
    out
}
