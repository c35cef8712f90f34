use super::utils::{Emitter, contains_ci};
use crate::model::RepoModel;
use crate::policy::EffectiveConfig;
use policyguard_types::{Finding, ids};

pub const REQUIRED_OWNERSHIP_PATTERNS: &[&str] = &[
    "CLAUDE.md",
    ".claude/**",
    ".github/workflows/",
    "requirements.txt",
    "CODEOWNERS",
];

pub const REQUIRED_GUIDANCE_PHRASES: &[&str] = &["untrusted", "PR", "Pull Request", "secrets"];

pub fn run(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    required_patterns(model, cfg, out);
    self_protection(model, cfg, out);
    guidance_phrases(model, cfg, out);
}

fn required_patterns(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_OWNERSHIP_REQUIRED_PATTERNS, out) else {
        return;
    };
    let doc = &model.ownership;
    let Some(text) = em.require_text(doc, "ownership file") else {
        return;
    };

    for pattern in REQUIRED_OWNERSHIP_PATTERNS {
        if !text.contains(pattern) {
            em.finding(
                ids::CODE_MISSING_PATTERN,
                &doc.path,
                *pattern,
                format!("ownership file '{}' does not cover '{pattern}'", doc.path),
            )
            .emit();
        }
    }
}

fn self_protection(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_OWNERSHIP_SELF_PROTECTION, out) else {
        return;
    };
    let doc = &model.ownership;
    let Some(text) = em.require_text(doc, "ownership file") else {
        return;
    };

    if !has_self_entry(text) {
        em.finding(
            ids::CODE_UNPROTECTED_OWNERSHIP_FILE,
            &doc.path,
            "CODEOWNERS",
            format!(
                "ownership file '{}' has no entry beginning with 'CODEOWNERS'",
                doc.path
            ),
        )
        .emit();
    }
}

/// A non-comment line whose trimmed text starts with `CODEOWNERS`.
fn has_self_entry(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .any(|line| !line.starts_with('#') && line.starts_with("CODEOWNERS"))
}

fn guidance_phrases(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_GUIDANCE_REQUIRED_PHRASES, out) else {
        return;
    };
    let doc = &model.guidance;
    let Some(text) = em.require_text(doc, "guidance document") else {
        return;
    };

    for phrase in REQUIRED_GUIDANCE_PHRASES {
        if !contains_ci(text, phrase) {
            em.finding(
                ids::CODE_MISSING_PHRASE,
                &doc.path,
                *phrase,
                format!("guidance document '{}' does not mention '{phrase}'", doc.path),
            )
            .emit();
        }
    }
}
