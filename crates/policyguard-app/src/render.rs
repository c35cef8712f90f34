//! Render use cases over an in-memory report.

use policyguard_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    policyguard_render::render_markdown(report)
}

/// At most `max` annotations; GitHub truncates long annotation lists anyway.
pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    policyguard_render::render_github_annotations(report)
        .into_iter()
        .take(max)
        .collect()
}

pub fn render_summary(report: &RenderableReport) -> String {
    policyguard_render::render_summary(report)
}
