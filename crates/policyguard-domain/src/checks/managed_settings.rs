//! Checks over the managed-settings JSON block embedded in the paired documents.

use super::settings::overlapping_rules;
use super::utils::Emitter;
use crate::extract::{JsonBlock, MANAGED_SETTINGS_MARKER, extract_json_block, json_diff_paths};
use crate::model::{RepoModel, SourceDoc};
use crate::policy::EffectiveConfig;
use crate::schema::{KeyViolation, MANAGED_KEYS, validate_keys};
use policyguard_types::{Finding, ids};
use serde_json::json;

const WHAT: &str = "paired document";

pub fn run(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    present(model, cfg, out);
    matching(model, cfg, out);
    keys(model, cfg, out);
    types(model, cfg, out);
    overlap(model, cfg, out);
}

/// Block of a readable document; document failures are emitted, absent blocks are not.
fn block_of(em: &mut Emitter<'_>, doc: &SourceDoc) -> Option<JsonBlock> {
    let text = em.require_text(doc, WHAT)?;
    extract_json_block(text, MANAGED_SETTINGS_MARKER)
}

fn present(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_DOCS_MANAGED_SETTINGS_PRESENT, out) else {
        return;
    };

    for doc in model.paired_documents() {
        let Some(text) = em.require_text(doc, WHAT) else {
            continue;
        };
        if extract_json_block(text, MANAGED_SETTINGS_MARKER).is_none() {
            em.finding(
                ids::CODE_MISSING_MANAGED_BLOCK,
                &doc.path,
                MANAGED_SETTINGS_MARKER,
                format!(
                    "{WHAT} '{}' has no ```json block containing '{MANAGED_SETTINGS_MARKER}'",
                    doc.path
                ),
            )
            .emit();
        }
    }
}

fn matching(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_DOCS_MANAGED_SETTINGS_MATCH, out) else {
        return;
    };
    let [left_doc, right_doc] = model.paired_documents();

    let left = block_of(&mut em, left_doc);
    let right = block_of(&mut em, right_doc);
    let (Some(left), Some(right)) = (left, right) else {
        return;
    };

    let paths = json_diff_paths(&left.value, &right.value);
    if paths.is_empty() {
        return;
    }
    em.finding(
        ids::CODE_MANAGED_SETTINGS_MISMATCH,
        &right_doc.path,
        left_doc.path.as_str(),
        format!(
            "managed-settings block in '{}' differs from '{}' at: {}",
            right_doc.path,
            left_doc.path,
            paths.join(", ")
        ),
    )
    .line(right.line)
    .data("other_document", left_doc.path.as_str())
    .data("other_line", left.line)
    .data("paths", json!(paths))
    .emit();
}

fn keys(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_DOCS_MANAGED_SETTINGS_KEYS, out) else {
        return;
    };

    for doc in model.paired_documents() {
        let Some(block) = block_of(&mut em, doc) else {
            continue;
        };
        for violation in validate_keys(&block.value, MANAGED_KEYS) {
            let KeyViolation::Missing { path } = violation else {
                continue;
            };
            em.finding(
                ids::CODE_MISSING_KEY,
                &doc.path,
                path,
                format!(
                    "{WHAT} '{}': managed-settings block is missing key '{path}'",
                    doc.path
                ),
            )
            .line(block.line)
            .emit();
        }
    }
}

fn types(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_DOCS_MANAGED_SETTINGS_TYPES, out) else {
        return;
    };

    for doc in model.paired_documents() {
        let Some(block) = block_of(&mut em, doc) else {
            continue;
        };
        for violation in validate_keys(&block.value, MANAGED_KEYS) {
            match violation {
                KeyViolation::Missing { .. } => {}
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
                            "{WHAT} '{}': managed-settings '{path}' must be {expected}, found {}",
                            doc.path,
                            found.as_str()
                        ),
                    )
                    .line(block.line)
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
                            "{WHAT} '{}': managed-settings '{path}' must be one of {}, found {found}",
                            doc.path,
                            allowed.join(", ")
                        ),
                    )
                    .line(block.line)
                    .data("allowed", json!(allowed))
                    .data("found", found)
                    .emit(),
            }
        }
    }
}

fn overlap(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_DOCS_MANAGED_SETTINGS_OVERLAP, out) else {
        return;
    };

    for doc in model.paired_documents() {
        let Some(block) = block_of(&mut em, doc) else {
            continue;
        };
        for rule in overlapping_rules(&block.value) {
            em.finding(
                ids::CODE_ALLOW_DENY_OVERLAP,
                &doc.path,
                rule,
                format!(
                    "{WHAT} '{}': managed-settings rule '{rule}' is both allowed and denied",
                    doc.path
                ),
            )
            .line(block.line)
            .emit();
        }
    }
}
