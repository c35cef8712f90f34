//! Repository adapter: locate and read the policy documents.
//!
//! This crate is the only one that touches the filesystem. Missing or unreadable
//! documents are recorded in the model, never raised as errors, so every check
//! still gets to report on them.

#![forbid(unsafe_code)]

mod discover;
mod load;

use camino::Utf8Path;
use policyguard_domain::model::{DirEntry, DocumentPaths, RepoModel};
use policyguard_types::RepoPath;

pub use discover::discover_workflows;
pub use load::{LoadError, load_document, read_text};

/// Build the in-memory model the checks evaluate.
///
/// Fails only when `repo_root` itself is not a directory.
pub fn build_repo_model(repo_root: &Utf8Path, paths: &DocumentPaths) -> anyhow::Result<RepoModel> {
    if !repo_root.is_dir() {
        anyhow::bail!("repository root is not a directory: {repo_root}");
    }
    tracing::debug!(repo_root = %repo_root, "building repository model");

    let load = |p: &RepoPath| load_document(repo_root, p);

    let extra_workflows = if paths.scan_all_workflows {
        discover_workflows(repo_root)
            .into_iter()
            .filter(|p| !paths.is_named_workflow(p))
            .map(|p| load(&p))
            .collect()
    } else {
        Vec::new()
    };

    let layout = paths
        .layout
        .iter()
        .map(|dir| DirEntry {
            path: dir.clone(),
            exists: repo_root.join(dir.as_str()).is_dir(),
        })
        .collect();

    let model = RepoModel {
        repo_root: RepoPath::from(repo_root),
        settings: load(&paths.settings),
        ownership: load(&paths.ownership),
        guidance: load(&paths.guidance),
        tutorial: load(&paths.tutorial),
        it_checklist: load(&paths.it_checklist),
        pr_workflow: load(&paths.pr_workflow),
        scheduled_workflow: load(&paths.scheduled_workflow),
        extra_workflows,
        layout,
    };

    tracing::debug!(
        documents = model.documents_scanned(),
        extra_workflows = model.extra_workflows.len(),
        "repository model ready"
    );
    Ok(model)
}
