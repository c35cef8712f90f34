//! The `explain` and `list-checks` use cases.

use policyguard_types::explain::{self, Explanation};

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown identifier; includes available check_ids and codes.
    NotFound {
        identifier: String,
        available_check_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

/// Look up an explanation for a check_id or code.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: explain::all_check_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\nRemediation\n-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\nExamples\n--------\n\n");

    let fenced = |label: &str, body: &str| {
        format!("{label}:\n```{}\n{body}\n```\n", exp.examples.lang)
    };
    out.push_str(&fenced("Before (violation)", exp.examples.before));
    out.push('\n');
    out.push_str(&fenced("After (fixed)", exp.examples.after));

    out
}

pub fn format_not_found(
    identifier: &str,
    check_ids: &[&'static str],
    codes: &[&'static str],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown check_id or code: {identifier}\n\n"));
    out.push_str("Available check_ids:\n");
    for id in check_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out.push_str("\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }

    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub check_id: &'static str,
    pub title: &'static str,
}

/// Every check in catalog order, with its title.
pub fn catalog() -> Vec<CatalogEntry> {
    explain::all_check_ids()
        .iter()
        .map(|&check_id| CatalogEntry {
            check_id,
            title: explain::lookup_explanation(check_id)
                .map(|e| e.title)
                .unwrap_or_default(),
        })
        .collect()
}

pub fn format_catalog(entries: &[CatalogEntry]) -> String {
    let width = entries.iter().map(|e| e.check_id.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| format!("{:<width$}  {}\n", e.check_id, e.title))
        .collect()
}
