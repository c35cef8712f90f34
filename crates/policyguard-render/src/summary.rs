use crate::{RenderableCheckStatus, RenderableReport, RenderableSeverity};

/// One line per catalog check followed by a verdict line, for terminal output.
///
/// Failing and warning checks list their finding messages indented beneath them.
pub fn render_summary(report: &RenderableReport) -> String {
    let mut out = String::new();

    for (check_id, status) in &report.data.checks {
        out.push_str(&format!("{:<4}  {}\n", status.label(), check_id));
        if matches!(
            status,
            RenderableCheckStatus::Fail | RenderableCheckStatus::Warn
        ) {
            for f in report.findings.iter().filter(|f| &f.check_id == check_id) {
                out.push_str(&format!("      - {}\n", f.message));
            }
        }
    }

    let count = |sev: RenderableSeverity| report.findings.iter().filter(|f| f.severity == sev).count();
    let errors = count(RenderableSeverity::Error);
    let warnings = count(RenderableSeverity::Warning);
    out.push_str(&format!(
        "\npolicyguard: {} ({} errors, {} warnings)\n",
        report.verdict.label(),
        errors,
        warnings
    ));
    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("note: {r}\n"));
    }
    out
}
