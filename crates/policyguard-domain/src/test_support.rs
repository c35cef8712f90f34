use crate::model::{DirEntry, RepoModel, SourceDoc};
use crate::policy::{CheckPolicy, EffectiveConfig, FailOn};
use policyguard_test_util::scaffold;
use policyguard_types::explain::all_check_ids;
use policyguard_types::{RepoPath, Severity};
use std::collections::BTreeMap;

/// A model in which every check passes.
pub fn compliant_model() -> RepoModel {
    RepoModel {
        repo_root: RepoPath::new("."),
        settings: SourceDoc::loaded(scaffold::SETTINGS_PATH, scaffold::SETTINGS),
        ownership: SourceDoc::loaded(scaffold::OWNERSHIP_PATH, scaffold::OWNERSHIP),
        guidance: SourceDoc::loaded(scaffold::GUIDANCE_PATH, scaffold::GUIDANCE),
        tutorial: SourceDoc::loaded(scaffold::TUTORIAL_PATH, scaffold::TUTORIAL),
        it_checklist: SourceDoc::loaded(scaffold::IT_CHECKLIST_PATH, scaffold::IT_CHECKLIST),
        pr_workflow: SourceDoc::loaded(scaffold::PR_WORKFLOW_PATH, scaffold::PR_WORKFLOW),
        scheduled_workflow: SourceDoc::loaded(
            scaffold::SCHEDULED_WORKFLOW_PATH,
            scaffold::SCHEDULED_WORKFLOW,
        ),
        extra_workflows: Vec::new(),
        layout: scaffold::LAYOUT_DIRS
            .iter()
            .map(|d| DirEntry {
                path: RepoPath::new(d),
                exists: true,
            })
            .collect(),
    }
}

/// Every catalog check enabled at `severity`.
pub fn config_all(severity: Severity) -> EffectiveConfig {
    let checks = all_check_ids()
        .iter()
        .map(|id| (id.to_string(), CheckPolicy::enabled(severity)))
        .collect();
    EffectiveConfig {
        profile: "test".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        checks,
    }
}

/// Only `check_id` enabled.
pub fn config_with_check(check_id: &str, severity: Severity) -> EffectiveConfig {
    config_with_check_allow(check_id, severity, Vec::new())
}

pub fn config_with_check_allow(
    check_id: &str,
    severity: Severity,
    allow: Vec<&str>,
) -> EffectiveConfig {
    let mut checks = BTreeMap::new();
    checks.insert(
        check_id.to_string(),
        CheckPolicy {
            enabled: true,
            severity,
            allow: allow.into_iter().map(str::to_string).collect(),
        },
    );
    EffectiveConfig {
        profile: "test".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        checks,
    }
}
