use crate::{RenderableReport, RenderableSeverity};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Policyguard report\n\n");
    out.push_str(&format!(
        "- Verdict: **{}**\n- Profile: `{}`\n- Documents scanned: {}\n- Findings: {} (emitted) / {} (total)\n\n",
        report.verdict.label(),
        report.data.profile,
        report.data.documents_scanned,
        report.data.findings_emitted,
        report.data.findings_total
    ));

    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("> Note: {r}\n\n"));
    }

    if !report.data.checks.is_empty() {
        out.push_str("## Checks\n\n| Check | Status |\n| --- | --- |\n");
        for (check_id, status) in &report.data.checks {
            out.push_str(&format!("| `{}` | {} |\n", check_id, status.label()));
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            RenderableSeverity::Info => "INFO",
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };

        out.push_str(&format!(
            "- [{}] `{}` / `{}`: {}",
            sev, f.check_id, f.code, f.message
        ));
        match &f.location {
            Some(loc) => match loc.line {
                Some(line) => out.push_str(&format!(" (`{}`:{})\n", loc.path, line)),
                None => out.push_str(&format!(" (`{}`)\n", loc.path)),
            },
            None => out.push('\n'),
        }

        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {help}\n"));
        }
    }

    out
}
