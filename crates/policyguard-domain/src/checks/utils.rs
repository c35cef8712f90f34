use crate::fingerprint::fingerprint_for;
use crate::model::{DocState, SourceDoc};
use crate::policy::{CheckPolicy, EffectiveConfig};
use globset::{Glob, GlobSet, GlobSetBuilder};
use policyguard_types::{Finding, Location, RepoPath, ids, lookup_explanation};
use serde_json::{Map, Value};

/// Allowlist entries are validated in policyguard-settings; anything that
/// still fails to compile here is ignored rather than aborting evaluation.
pub fn build_allowlist(allow: &[String]) -> Option<GlobSet> {
    if allow.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in allow {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().ok()
}

pub fn is_allowed(allow: Option<&GlobSet>, value: &str) -> bool {
    allow.map(|set| set.is_match(value)).unwrap_or(false)
}

/// Collects findings for one check under its effective policy.
pub struct Emitter<'a> {
    check_id: &'static str,
    policy: &'a CheckPolicy,
    allow: Option<GlobSet>,
    out: &'a mut Vec<Finding>,
}

impl<'a> Emitter<'a> {
    /// `None` when the check is disabled.
    pub fn new(
        cfg: &'a EffectiveConfig,
        check_id: &'static str,
        out: &'a mut Vec<Finding>,
    ) -> Option<Self> {
        let policy = cfg.check_policy(check_id)?;
        Some(Self {
            check_id,
            policy,
            allow: build_allowlist(&policy.allow),
            out,
        })
    }

    pub fn finding<'e>(
        &'e mut self,
        code: &'static str,
        document: &RepoPath,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Draft<'e, 'a> {
        let subject = subject.into();
        let finding = Finding {
            severity: self.policy.severity,
            check_id: self.check_id.to_string(),
            code: code.to_string(),
            message: message.into(),
            location: Some(Location::file(document)),
            help: lookup_explanation(self.check_id).map(|e| e.remediation.to_string()),
            url: None,
            fingerprint: Some(fingerprint_for(
                self.check_id,
                code,
                document.as_str(),
                &subject,
            )),
            data: Value::Null,
        };
        let mut data = Map::new();
        data.insert("document".into(), Value::from(document.as_str()));
        data.insert("subject".into(), Value::from(subject.as_str()));
        Draft {
            emitter: self,
            finding,
            subject,
            data,
        }
    }

    /// Returns the document text, or emits the shared document failure finding.
    pub fn require_text<'d>(&mut self, doc: &'d SourceDoc, what: &str) -> Option<&'d str> {
        match &doc.state {
            DocState::Loaded(text) => Some(text),
            DocState::Missing => {
                self.finding(
                    ids::CODE_DOCUMENT_MISSING,
                    &doc.path,
                    doc.path.as_str(),
                    format!("{what} '{}' does not exist", doc.path),
                )
                .help(format!("Create '{}'.", doc.path))
                .emit();
                None
            }
            DocState::Unreadable(reason) => {
                self.finding(
                    ids::CODE_DOCUMENT_UNREADABLE,
                    &doc.path,
                    doc.path.as_str(),
                    format!("{what} '{}' could not be read: {reason}", doc.path),
                )
                .help("Make the file readable UTF-8 text.")
                .data("reason", reason.as_str())
                .emit();
                None
            }
        }
    }

    /// Emits `document_malformed` for a structural parse error.
    pub fn malformed(&mut self, doc: &SourceDoc, what: &str, detail: impl Into<String>) {
        let detail = detail.into();
        self.finding(
            ids::CODE_DOCUMENT_MALFORMED,
            &doc.path,
            doc.path.as_str(),
            format!("{what} '{}' is malformed: {detail}", doc.path),
        )
        .help("Fix the syntax so the document parses.")
        .data("reason", detail)
        .emit();
    }
}

/// A finding under construction; dropped without effect unless `emit` is called.
pub struct Draft<'e, 'a> {
    emitter: &'e mut Emitter<'a>,
    finding: Finding,
    subject: String,
    data: Map<String, Value>,
}

impl Draft<'_, '_> {
    pub fn line(mut self, line: u32) -> Self {
        if let Some(loc) = self.finding.location.as_mut() {
            loc.line = Some(line);
        }
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.finding.help = Some(help.into());
        self
    }

    pub fn data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Push the finding unless its subject is allowlisted.
    pub fn emit(self) {
        let Draft {
            emitter,
            mut finding,
            subject,
            data,
        } = self;
        if is_allowed(emitter.allow.as_ref(), &subject) {
            return;
        }
        finding.data = Value::Object(data);
        emitter.out.push(finding);
    }
}

/// Case-insensitive substring test.
pub fn contains_ci(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}
