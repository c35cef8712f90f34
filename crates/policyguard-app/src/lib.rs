//! Use case orchestration for policyguard.
//!
//! This crate coordinates the settings, repo, domain, and render layers. The CLI
//! depends on it and only handles argument parsing, IO, and exit codes.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod render;
mod report;

pub use check::{CheckInput, CheckOutput, run_check, verdict_exit_code};
pub use explain::{
    CatalogEntry, ExplainOutput, catalog, format_catalog, format_explanation, format_not_found,
    run_explain,
};
pub use render::{render_annotations, render_markdown, render_summary};
pub use report::{parse_report_json, runtime_error_report, serialize_report, to_renderable};
