#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdictStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableCheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl RenderableCheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            RenderableCheckStatus::Pass => "PASS",
            RenderableCheckStatus::Warn => "WARN",
            RenderableCheckStatus::Fail => "FAIL",
            RenderableCheckStatus::Skip => "SKIP",
        }
    }
}

impl RenderableVerdictStatus {
    pub fn label(self) -> &'static str {
        match self {
            RenderableVerdictStatus::Pass => "PASS",
            RenderableVerdictStatus::Warn => "WARN",
            RenderableVerdictStatus::Fail => "FAIL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableLocation {
    pub path: String,
    pub line: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableFinding {
    pub severity: RenderableSeverity,
    pub check_id: String,
    pub code: String,
    pub message: String,
    pub location: Option<RenderableLocation>,
    pub help: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RenderableData {
    pub profile: String,
    pub documents_scanned: u32,
    pub findings_emitted: u32,
    pub findings_total: u32,
    pub truncated_reason: Option<String>,
    /// Catalog order as stored in the report (sorted by check_id).
    pub checks: Vec<(String, RenderableCheckStatus)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdictStatus,
    pub findings: Vec<RenderableFinding>,
    pub data: RenderableData,
}
