use super::utils::{Emitter, contains_ci};
use crate::extract::{
    REQUIRE_HASHES_FLAG, action_refs, pip_installs, requires_hashes, unknown_branches,
};
use crate::model::{RepoModel, SourceDoc};
use crate::policy::EffectiveConfig;
use policyguard_types::{Finding, ids};

const WHAT: &str = "workflow";

pub fn run(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    well_formed(model, cfg, out);

    required_text(
        &model.pr_workflow,
        cfg,
        out,
        Needle {
            check_id: ids::CHECK_WORKFLOWS_SECRET_SCANNING,
            code: ids::CODE_MISSING_SECRET_SCAN,
            text: "gitleaks",
            case_insensitive: true,
            purpose: "secret scanning",
        },
    );
    required_text(
        &model.pr_workflow,
        cfg,
        out,
        Needle {
            check_id: ids::CHECK_WORKFLOWS_OWNERSHIP_VALIDATION,
            code: ids::CODE_MISSING_OWNERSHIP_VALIDATION,
            text: "CODEOWNERS",
            case_insensitive: false,
            purpose: "ownership validation",
        },
    );
    required_text(
        &model.scheduled_workflow,
        cfg,
        out,
        Needle {
            check_id: ids::CHECK_WORKFLOWS_PROTECTED_ENVIRONMENT,
            code: ids::CODE_MISSING_PROTECTED_ENVIRONMENT,
            text: "environment:",
            case_insensitive: false,
            purpose: "a protected deployment environment",
        },
    );
    required_text(
        &model.scheduled_workflow,
        cfg,
        out,
        Needle {
            check_id: ids::CHECK_WORKFLOWS_ENVIRONMENT_PROTECTION_CHECK,
            code: ids::CODE_MISSING_PROTECTION_RULE_CHECK,
            text: "protection_rules",
            case_insensitive: false,
            purpose: "a check of the environment's protection rules",
        },
    );

    pinned_actions(model, cfg, out);
    fail_closed(model, cfg, out);
    hash_verified_installs(model, cfg, out);
}

fn well_formed(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_WORKFLOWS_WELL_FORMED, out) else {
        return;
    };

    for doc in model.workflows() {
        let Some(text) = em.require_text(doc, WHAT) else {
            continue;
        };
        if let Err(detail) = workflow_shape(text) {
            em.malformed(doc, WHAT, detail);
        }
    }
}

fn workflow_shape(text: &str) -> Result<(), String> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    let Some(mapping) = value.as_mapping() else {
        return Err("top level is not a mapping".to_string());
    };
    if !mapping.contains_key("jobs") {
        return Err("no 'jobs' key".to_string());
    }
    Ok(())
}

struct Needle {
    check_id: &'static str,
    code: &'static str,
    text: &'static str,
    case_insensitive: bool,
    purpose: &'static str,
}

fn required_text(doc: &SourceDoc, cfg: &EffectiveConfig, out: &mut Vec<Finding>, needle: Needle) {
    let Some(mut em) = Emitter::new(cfg, needle.check_id, out) else {
        return;
    };
    let Some(text) = em.require_text(doc, WHAT) else {
        return;
    };

    let found = if needle.case_insensitive {
        contains_ci(text, needle.text)
    } else {
        text.contains(needle.text)
    };
    if !found {
        em.finding(
            needle.code,
            &doc.path,
            needle.text,
            format!(
                "{WHAT} '{}' has no {} step (expected '{}')",
                doc.path, needle.purpose, needle.text
            ),
        )
        .emit();
    }
}

fn pinned_actions(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_WORKFLOWS_PINNED_ACTIONS, out) else {
        return;
    };

    for doc in model.all_workflows() {
        let Some(text) = em.require_text(doc, WHAT) else {
            continue;
        };
        for action in action_refs(text) {
            if !action.is_external() || action.is_sha_pinned() {
                continue;
            }
            let pin = action.pin.unwrap_or_default();
            let message = format!(
                "{WHAT} '{}' uses '{}' pinned to '{pin}', not a full commit SHA",
                doc.path, action.action
            );
            em.finding(ids::CODE_UNPINNED_ACTION, &doc.path, action.action, message)
                .line(action.line)
                .data("uses", action.uses)
                .data("pin", pin)
                .emit();
        }
    }
}

fn fail_closed(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_WORKFLOWS_FAIL_CLOSED, out) else {
        return;
    };
    let doc = &model.scheduled_workflow;
    let Some(text) = em.require_text(doc, WHAT) else {
        return;
    };

    let branches = unknown_branches(text);
    if branches.is_empty() {
        em.finding(
            ids::CODE_MISSING_FAIL_CLOSED_BRANCH,
            &doc.path,
            "unknown",
            format!(
                "{WHAT} '{}' has no branch handling an 'unknown' environment classification",
                doc.path
            ),
        )
        .emit();
        return;
    }

    for branch in branches.iter().filter(|b| !b.fails_closed()) {
        em.finding(
            ids::CODE_FAIL_OPEN_BRANCH,
            &doc.path,
            format!("unknown:{}", branch.line),
            format!(
                "{WHAT} '{}': 'unknown' branch at line {} does not reach a non-zero exit",
                doc.path, branch.line
            ),
        )
        .line(branch.line)
        .data("kind", format!("{:?}", branch.kind))
        .emit();
    }
}

fn hash_verified_installs(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_WORKFLOWS_HASH_VERIFIED_INSTALLS, out) else {
        return;
    };

    for doc in model.workflows() {
        let Some(text) = em.require_text(doc, WHAT) else {
            continue;
        };

        if !requires_hashes(text) {
            em.finding(
                ids::CODE_MISSING_HASH_VERIFIED_INSTALL,
                &doc.path,
                REQUIRE_HASHES_FLAG,
                format!(
                    "{WHAT} '{}' never installs packages with '{REQUIRE_HASHES_FLAG}'",
                    doc.path
                ),
            )
            .emit();
        }

        for install in pip_installs(text).into_iter().filter(|i| !i.hash_verified) {
            em.finding(
                ids::CODE_UNVERIFIED_INSTALL,
                &doc.path,
                install.command.as_str(),
                format!(
                    "{WHAT} '{}': '{}' installs without hash verification",
                    doc.path, install.command
                ),
            )
            .line(install.line)
            .emit();
        }
    }
}
