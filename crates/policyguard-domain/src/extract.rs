//! Shared text and JSON extraction used by the checks.
//!
//! Everything here works on in-memory text and never panics on arbitrary input.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Top-level key that identifies the managed-settings block in the paired documents.
pub const MANAGED_SETTINGS_MARKER: &str = "allowManagedPermissionRulesOnly";

/// Full commit SHAs are 40 hex characters; tags like `v4` are much shorter.
pub const MIN_PIN_LEN: usize = 40;

static CASE_ARM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?\s*([^()\s;]+(?:\s*\|\s*[^()\s;]+)*)\s*\)(.*)$").expect("case arm regex")
});
static SHELL_IF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:el)?if\s+(.*)$").expect("shell if regex"));
static STEP_IF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-\s+)?if:\s*(.*)$").expect("step if regex"));
static THEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bthen\b").expect("then regex"));
static IF_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:fi|else|elif)\b").expect("if end regex"));
static UNKNOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bunknown\b").expect("unknown regex"));
static GUARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bunknown\b.*?(?:&&|\|\|)(.*)$").expect("guard regex"));
static EXIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexit\s+([0-9]+)\b").expect("exit regex"));
static NEGATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!=|\s-ne\s|^!\s|\[\[?\s+!\s").expect("negated test regex")
});
static IF_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:elif|else|if|fi)\b").expect("if word regex"));
static PIP_INSTALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpip3?\s+install\b").expect("pip install regex"));

// ---------------------------------------------------------------------------
// Embedded JSON blocks
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct JsonBlock {
    pub value: Value,
    /// 1-based line of the opening fence.
    pub line: u32,
}

/// Return the first ```` ```json ```` fenced block that parses as an object
/// containing `marker` at the top level.
///
/// Blocks that fail to parse are skipped, not reported.
pub fn extract_json_block(text: &str, marker: &str) -> Option<JsonBlock> {
    const FENCE: &str = "```json";

    for (idx, _) in text.match_indices(FENCE) {
        let rest = &text[idx + FENCE.len()..];
        let body = rest.split("```").next().unwrap_or_default().trim();
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            continue;
        };
        if value.as_object().is_some_and(|o| o.contains_key(marker)) {
            return Some(JsonBlock {
                value,
                line: line_of_offset(text, idx),
            });
        }
    }
    None
}

fn line_of_offset(text: &str, offset: usize) -> u32 {
    (text[..offset.min(text.len())].matches('\n').count() + 1) as u32
}

// ---------------------------------------------------------------------------
// JSON shape helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

/// Resolve a dotted key path (`sandbox.network.allowedDomains`).
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// String items of an array value; non-strings are ignored, non-arrays yield nothing.
pub fn string_items(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Sorted JSON paths at which two values differ. Empty when equal.
pub fn json_diff_paths(a: &Value, b: &Value) -> Vec<String> {
    let mut out = Vec::new();
    diff_into(a, b, "", &mut out);
    out.sort();
    out.dedup();
    out
}

fn diff_into(a: &Value, b: &Value, prefix: &str, out: &mut Vec<String>) {
    let here = || {
        if prefix.is_empty() {
            "$".to_string()
        } else {
            prefix.to_string()
        }
    };
    match (a, b) {
        (Value::Object(ao), Value::Object(bo)) => {
            let keys: std::collections::BTreeSet<&String> = ao.keys().chain(bo.keys()).collect();
            for key in keys {
                let child = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match (ao.get(key), bo.get(key)) {
                    (Some(av), Some(bv)) => diff_into(av, bv, &child, out),
                    _ => out.push(child),
                }
            }
        }
        (Value::Array(aa), Value::Array(ba)) if aa.len() == ba.len() => {
            for (i, (av, bv)) in aa.iter().zip(ba).enumerate() {
                diff_into(av, bv, &format!("{}[{i}]", here()), out);
            }
        }
        _ => {
            if a != b {
                out.push(here());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow action references
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRef<'a> {
    /// 1-based line number.
    pub line: u32,
    /// The `uses:` value with comments and quotes removed.
    pub uses: &'a str,
    /// Everything before the last `@` (or the whole value).
    pub action: &'a str,
    /// First token after the last `@`, if any.
    pub pin: Option<&'a str>,
}

impl ActionRef<'_> {
    /// Only `owner/repo@ref` references are judged. Local actions, docker images,
    /// refs without `@`, and `${{ }}` expressions carry no git pin.
    pub fn is_external(&self) -> bool {
        !(self.uses.starts_with("./") || self.uses.starts_with("docker://"))
            && self.pin.is_some_and(|p| !p.starts_with('$'))
    }

    pub fn is_sha_pinned(&self) -> bool {
        self.pin.is_some_and(|p| p.chars().count() >= MIN_PIN_LEN)
    }
}

/// Every `uses:` / `- uses:` line in a workflow.
pub fn action_refs(text: &str) -> Vec<ActionRef<'_>> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        let Some(value) = trimmed
            .strip_prefix("- uses:")
            .or_else(|| trimmed.strip_prefix("uses:"))
        else {
            continue;
        };
        let value = strip_yaml_comment(value).trim();
        let value = value.trim_matches(|c| c == '"' || c == '\'');

        let (action, pin) = match value.rsplit_once('@') {
            Some((action, pin)) => (action, pin.split_whitespace().next().or(Some(""))),
            None => (value, None),
        };
        out.push(ActionRef {
            line: (idx + 1) as u32,
            uses: value,
            action,
            pin,
        });
    }
    out
}

fn strip_yaml_comment(s: &str) -> &str {
    match s.find(" #") {
        Some(idx) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Fail-closed branches
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    /// `unknown) ... ;;`
    CaseArm,
    /// `if` / `elif` whose test mentions `unknown`.
    IfTest,
    /// `if` / `elif` whose test excludes `unknown`; the `else` body is the branch.
    NegatedIfTest,
    /// Workflow step-level `if:` condition mentioning `unknown`.
    StepCondition,
    /// `[ "$x" = unknown ] && exit 1` on one line.
    Guard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownBranch {
    pub kind: BranchKind,
    /// 1-based line of the branch head.
    pub line: u32,
    /// 1-based line of the first non-zero `exit` inside the branch body.
    pub exit_line: Option<u32>,
}

impl UnknownBranch {
    pub fn fails_closed(&self) -> bool {
        self.exit_line.is_some()
    }
}

/// Find every branch taken on an `unknown` classification and whether it reaches
/// an explicit non-zero `exit` before the next branch or block boundary.
pub fn unknown_branches(text: &str) -> Vec<UnknownBranch> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();

    for (idx, raw) in lines.iter().enumerate() {
        let t = raw.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        let Some((kind, body)) = classify_branch(t) else {
            continue;
        };
        let exit_line = match kind {
            BranchKind::NegatedIfTest => else_branch_exit(&lines, idx, indent_of(raw), body),
            _ => scan_branch_body(&lines, idx, indent_of(raw), body, kind),
        };
        out.push(UnknownBranch {
            kind,
            line: (idx + 1) as u32,
            exit_line,
        });
    }
    out
}

fn classify_branch(t: &str) -> Option<(BranchKind, &str)> {
    if let Some(caps) = STEP_IF.captures(t) {
        let cond = caps.get(1).map_or("", |m| m.as_str());
        // A negated condition runs the step when the class is known.
        return (UNKNOWN.is_match(cond) && !cond.contains('!'))
            .then_some((BranchKind::StepCondition, ""));
    }
    if let Some(caps) = SHELL_IF.captures(t) {
        let rest = caps.get(1).map_or("", |m| m.as_str());
        let (cond, body) = match THEN.find(rest) {
            Some(m) => (&rest[..m.start()], &rest[m.end()..]),
            None => (rest, ""),
        };
        if !UNKNOWN.is_match(cond) {
            return None;
        }
        let kind = if NEGATED.is_match(cond) {
            BranchKind::NegatedIfTest
        } else {
            BranchKind::IfTest
        };
        return Some((kind, body));
    }
    if let Some(caps) = CASE_ARM.captures(t) {
        let patterns = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        let matches_unknown = patterns
            .split('|')
            .map(|p| p.trim().trim_matches(|c| c == '"' || c == '\''))
            .any(|p| p == "unknown");
        return matches_unknown.then_some((BranchKind::CaseArm, body));
    }
    GUARD
        .captures(t)
        .map(|caps| (BranchKind::Guard, caps.get(1).map_or("", |m| m.as_str())))
}

fn scan_branch_body(
    lines: &[&str],
    head: usize,
    head_indent: usize,
    inline_body: &str,
    kind: BranchKind,
) -> Option<u32> {
    let (segment, terminated) = cut_at_terminator(inline_body, kind);
    if has_nonzero_exit(segment) {
        return Some((head + 1) as u32);
    }
    if terminated || kind == BranchKind::Guard {
        return None;
    }

    for (idx, raw) in lines.iter().enumerate().skip(head + 1) {
        let t = raw.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if indent_of(raw) < head_indent
            || t == "-"
            || t.starts_with("- ")
            || starts_with_word(t, &["esac", "fi", "else", "elif"])
            || (kind != BranchKind::StepCondition && CASE_ARM.is_match(t))
        {
            return None;
        }
        let (segment, terminated) = cut_at_terminator(t, kind);
        if has_nonzero_exit(segment) {
            return Some((idx + 1) as u32);
        }
        if terminated {
            return None;
        }
    }
    None
}

/// Exit line of the `else` body belonging to a negated `if`. Without an `else`
/// the `unknown` case falls through and the branch fails open.
fn else_branch_exit(
    lines: &[&str],
    head: usize,
    head_indent: usize,
    inline_body: &str,
) -> Option<u32> {
    let following = lines.iter().enumerate().skip(head + 1).map(|(i, l)| (i, *l));
    let mut depth = 0usize;

    for (idx, raw) in std::iter::once((head, inline_body)).chain(following) {
        let t = raw.trim();
        let indent = if idx == head {
            head_indent
        } else {
            if t.is_empty() || t.starts_with('#') {
                continue;
            }
            if indent_of(raw) < head_indent || t == "-" || t.starts_with("- ") {
                return None;
            }
            indent_of(raw)
        };
        for word in IF_WORD.find_iter(t) {
            match word.as_str() {
                "if" => depth += 1,
                "fi" if depth == 0 => return None,
                "fi" => depth -= 1,
                "else" if depth == 0 => {
                    return scan_branch_body(
                        lines,
                        idx,
                        indent,
                        &t[word.end()..],
                        BranchKind::IfTest,
                    );
                }
                _ => {}
            }
        }
    }
    None
}

fn cut_at_terminator(s: &str, kind: BranchKind) -> (&str, bool) {
    let cut = match kind {
        BranchKind::CaseArm => s.find(";;"),
        BranchKind::IfTest | BranchKind::NegatedIfTest => IF_END.find(s).map(|m| m.start()),
        BranchKind::StepCondition | BranchKind::Guard => None,
    };
    match cut {
        Some(at) => (&s[..at], true),
        None => (s, false),
    }
}

fn has_nonzero_exit(s: &str) -> bool {
    EXIT.captures_iter(s).any(|caps| {
        caps.get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .is_some_and(|code| code != 0)
    })
}

fn starts_with_word(t: &str, words: &[&str]) -> bool {
    words.iter().any(|w| {
        t.strip_prefix(w)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    })
}

fn indent_of(raw: &str) -> usize {
    raw.len() - raw.trim_start().len()
}

// ---------------------------------------------------------------------------
// Package installs
// ---------------------------------------------------------------------------

/// Environment variable that turns on hash checking for every `pip install`.
pub const PIP_REQUIRE_HASHES_ENV: &str = "PIP_REQUIRE_HASHES";
pub const REQUIRE_HASHES_FLAG: &str = "--require-hashes";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallCommand {
    /// 1-based line where the (possibly continued) command starts.
    pub line: u32,
    pub command: String,
    pub hash_verified: bool,
}

/// Whether any `env:` mapping in the workflow sets `name` to an enabled value.
/// Text that is not YAML declares nothing.
pub fn declares_env(text: &str, name: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(text).is_ok_and(|doc| env_enabled(&doc, name))
}

fn env_enabled(node: &serde_yaml::Value, name: &str) -> bool {
    match node {
        serde_yaml::Value::Mapping(map) => map.iter().any(|(key, value)| {
            let declared = key.as_str() == Some("env")
                && value
                    .as_mapping()
                    .and_then(|env| env.get(name))
                    .is_some_and(is_truthy);
            declared || env_enabled(value, name)
        }),
        serde_yaml::Value::Sequence(items) => items.iter().any(|item| env_enabled(item, name)),
        _ => false,
    }
}

fn is_truthy(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Bool(b) => *b,
        serde_yaml::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_yaml::Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
        _ => false,
    }
}

/// Hash checking is requested by a `PIP_REQUIRE_HASHES` env key or by
/// `--require-hashes` outside a comment.
pub fn requires_hashes(text: &str) -> bool {
    declares_env(text, PIP_REQUIRE_HASHES_ENV)
        || text.lines().any(|raw| {
            let t = raw.trim();
            !t.starts_with('#') && strip_yaml_comment(t).contains(REQUIRE_HASHES_FLAG)
        })
}

/// Every `pip install` command, joining `\` continuation lines.
pub fn pip_installs(text: &str) -> Vec<InstallCommand> {
    let env_verified = declares_env(text, PIP_REQUIRE_HASHES_ENV);
    let mut out = Vec::new();
    let mut pending: Option<(u32, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let t = strip_yaml_comment(raw.trim()).trim_end();
        let (start, mut logical) = match pending.take() {
            Some((start, acc)) => (start, acc),
            None => {
                if t.starts_with('#') {
                    continue;
                }
                ((idx + 1) as u32, String::new())
            }
        };
        match t.strip_suffix('\\') {
            Some(head) => {
                logical.push_str(head.trim_end());
                logical.push(' ');
                pending = Some((start, logical));
            }
            None => {
                logical.push_str(t);
                if PIP_INSTALL.is_match(&logical) {
                    out.push(InstallCommand {
                        line: start,
                        hash_verified: env_verified || logical.contains(REQUIRE_HASHES_FLAG),
                        command: logical,
                    });
                }
            }
        }
    }
    if let Some((start, logical)) = pending
        && PIP_INSTALL.is_match(&logical)
    {
        out.push(InstallCommand {
            line: start,
            hash_verified: env_verified || logical.contains(REQUIRE_HASHES_FLAG),
            command: logical.trim_end().to_string(),
        });
    }
    out
}
