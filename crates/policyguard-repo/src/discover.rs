use camino::{Utf8Path, Utf8PathBuf};
use policyguard_domain::model::WORKFLOWS_DIR;
use policyguard_types::RepoPath;
use std::path::PathBuf;
use walkdir::WalkDir;

/// List `*.yml` / `*.yaml` files directly under `.github/workflows`, sorted.
///
/// A missing workflows directory yields an empty list.
pub fn discover_workflows(repo_root: &Utf8Path) -> Vec<RepoPath> {
    let dir = repo_root.join(WORKFLOWS_DIR);
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut out: Vec<RepoPath> = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter(|p| matches!(p.extension(), Some("yml" | "yaml")))
        .map(|abs| {
            let rel = abs.strip_prefix(repo_root).unwrap_or(&abs);
            RepoPath::new(rel.as_str())
        })
        .collect();

    out.sort();
    out.dedup();
    out
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
