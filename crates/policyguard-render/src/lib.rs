//! Rendering for CI surfaces (Markdown, GitHub annotations) and the terminal.
//!
//! Renderers work on a flattened view of the report so they stay independent of
//! the serialized schema.

#![forbid(unsafe_code)]

mod gha;
mod markdown;
mod model;
mod summary;

pub use gha::render_github_annotations;
pub use markdown::render_markdown;
pub use model::{
    RenderableCheckStatus, RenderableData, RenderableFinding, RenderableLocation,
    RenderableReport, RenderableSeverity, RenderableVerdictStatus,
};
pub use summary::render_summary;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn failing_report() -> RenderableReport {
        RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings: vec![
                RenderableFinding {
                    severity: RenderableSeverity::Error,
                    check_id: "settings.network_allowlist".to_string(),
                    code: "missing_required_domain".to_string(),
                    message: "allowlist is missing required domain `github.com`".to_string(),
                    location: Some(RenderableLocation {
                        path: ".claude/settings.json".to_string(),
                        line: Some(12),
                    }),
                    help: Some("Add the domain to sandbox.network.allowedDomains.".to_string()),
                },
                RenderableFinding {
                    severity: RenderableSeverity::Warning,
                    check_id: "repo.layout".to_string(),
                    code: "missing_directory".to_string(),
                    message: "scaffold directory `ops` is missing".to_string(),
                    location: None,
                    help: None,
                },
            ],
            data: RenderableData {
                profile: "strict".to_string(),
                documents_scanned: 7,
                findings_emitted: 2,
                findings_total: 2,
                truncated_reason: None,
                checks: vec![
                    ("repo.layout".to_string(), RenderableCheckStatus::Warn),
                    ("settings.network_allowlist".to_string(), RenderableCheckStatus::Fail),
                    ("settings.sandbox".to_string(), RenderableCheckStatus::Pass),
                    ("workflows.well_formed".to_string(), RenderableCheckStatus::Skip),
                ],
            },
        }
    }

    pub fn passing_report() -> RenderableReport {
        RenderableReport {
            verdict: RenderableVerdictStatus::Pass,
            findings: Vec::new(),
            data: RenderableData {
                profile: "strict".to_string(),
                documents_scanned: 7,
                checks: vec![("settings.sandbox".to_string(), RenderableCheckStatus::Pass)],
                ..RenderableData::default()
            },
        }
    }
}
