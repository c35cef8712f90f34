use super::utils::Emitter;
use crate::model::RepoModel;
use crate::policy::EffectiveConfig;
use policyguard_types::{Finding, ids};
use serde_json::json;

pub fn run(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    required_files(model, cfg, out);
    layout(model, cfg, out);
}

fn required_files(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_REPO_REQUIRED_FILES, out) else {
        return;
    };

    for doc in model.required_documents() {
        if doc.exists() {
            continue;
        }
        em.finding(
            ids::CODE_MISSING_FILE,
            &doc.path,
            doc.path.as_str(),
            format!("required file '{}' does not exist", doc.path),
        )
        .emit();
    }
}

fn layout(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    let Some(mut em) = Emitter::new(cfg, ids::CHECK_REPO_LAYOUT, out) else {
        return;
    };

    for dir in model.layout.iter().filter(|d| !d.exists) {
        em.finding(
            ids::CODE_MISSING_DIRECTORY,
            &dir.path,
            dir.path.as_str(),
            format!("scaffold directory '{}' does not exist", dir.path),
        )
        .data("expected", json!("directory"))
        .emit();
    }
}
