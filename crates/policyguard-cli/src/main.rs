//! CLI entry point for policyguard.
//!
//! Argument parsing, IO, logging setup, and exit codes. Everything else lives in
//! `policyguard-app`.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use policyguard_app::{
    CheckInput, ExplainOutput, catalog, format_catalog, format_explanation, format_not_found,
    parse_report_json, render_annotations, render_markdown, render_summary, run_check,
    run_explain, runtime_error_report, serialize_report, to_renderable, verdict_exit_code,
};
use policyguard_settings::Overrides;
use policyguard_types::PolicyguardReport;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "policyguard.toml";

#[derive(Parser, Debug)]
#[command(
    name = "policyguard",
    version,
    about = "Security policy conformance checks for agent-assisted pipeline repositories"
)]
struct Cli {
    /// Repository root (directory holding the policy documents).
    #[arg(long, global = true, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Config TOML, relative to the repo root. Defaults to `policyguard.toml` if present.
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override profile (strict|warn|compat).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long, global = true)]
    max_findings: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate every policy check and write the JSON report.
    Check {
        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/policyguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/policyguard/comment.md")]
        markdown_out: Utf8PathBuf,

        /// Do not print the per-check summary.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Render markdown from an existing JSON report.
    Md {
        #[arg(long, default_value = "artifacts/policyguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (stdout if omitted).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        #[arg(long, default_value = "artifacts/policyguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// A check_id (e.g. "workflows.pinned_actions") or code (e.g. "unpinned_action").
        identifier: String,
    },

    /// List every check in the catalog.
    ListChecks,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("policyguard error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match &cli.cmd {
        Commands::Check {
            report_out,
            write_markdown,
            markdown_out,
            quiet,
        } => {
            let markdown_out = write_markdown.then_some(markdown_out.as_path());
            cmd_check(&cli, report_out, markdown_out, *quiet)
        }
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(report, *max),
        Commands::Explain { identifier } => Ok(cmd_explain(identifier)),
        Commands::ListChecks => {
            print!("{}", format_catalog(&catalog()));
            Ok(0)
        }
    }
}

fn cmd_check(
    cli: &Cli,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
    quiet: bool,
) -> anyhow::Result<i32> {
    let repo_root = cli
        .repo_root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.repo_root.clone());

    let result = (|| -> anyhow::Result<i32> {
        let cfg_text = load_config_text(&repo_root, cli.config.as_deref())?;

        let output = run_check(CheckInput {
            repo_root: &repo_root,
            config_text: &cfg_text,
            overrides: Overrides {
                profile: cli.profile.clone(),
                max_findings: cli.max_findings,
            },
        })?;

        write_report_file(report_out, &output.report).context("write report json")?;

        let renderable = to_renderable(&output.report);
        if let Some(path) = markdown_out {
            write_text_file(path, &render_markdown(&renderable)).context("write markdown")?;
        }
        if !quiet {
            print!("{}", render_summary(&renderable));
        }

        Ok(verdict_exit_code(output.report.verdict.status))
    })();

    result.or_else(|err| {
        let report = runtime_error_report(&format!("{err:#}"));
        if let Err(write_err) = write_report_file(report_out, &report) {
            tracing::warn!(error = %write_err, "could not write runtime error report");
        }
        Err(err)
    })
}

/// Missing default config means defaults; an explicit `--config` must exist.
fn load_config_text(repo_root: &Utf8Path, config: Option<&Utf8Path>) -> anyhow::Result<String> {
    match config {
        Some(path) => {
            let path = repo_root.join(path);
            std::fs::read_to_string(&path).with_context(|| format!("read config: {path}"))
        }
        None => {
            let path = repo_root.join(DEFAULT_CONFIG);
            match std::fs::read_to_string(&path) {
                Ok(text) => Ok(text),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path, "no config file, using defaults");
                    Ok(String::new())
                }
                Err(err) => Err(err).with_context(|| format!("read config: {path}")),
            }
        }
    }
}

fn write_report_file(path: &Utf8Path, report: &PolicyguardReport) -> anyhow::Result<()> {
    let data = serialize_report(report).context("serialize report")?;
    write_bytes(path, &data).with_context(|| format!("write report: {path}"))
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes(path, text.as_bytes()).with_context(|| format!("write text: {path}"))
}

fn write_bytes(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<i32> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&to_renderable(&report));

    match output {
        Some(out_path) => write_text_file(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }
    Ok(0)
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<i32> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;

    for annotation in render_annotations(&to_renderable(&report), max) {
        println!("{annotation}");
    }
    Ok(0)
}

fn cmd_explain(identifier: &str) -> i32 {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            0
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            1
        }
    }
}
