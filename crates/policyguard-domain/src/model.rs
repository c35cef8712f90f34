use policyguard_types::RepoPath;

/// Directory scanned for extra workflow files.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Scaffold directories every pipeline repository carries.
pub const DEFAULT_LAYOUT: &[&str] = &[
    "scrapers",
    "pipelines",
    "connectors",
    "schemas",
    "data/inbox",
    "output",
    "ops",
];

/// Where each document lives, relative to the repository root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentPaths {
    pub settings: RepoPath,
    pub ownership: RepoPath,
    pub guidance: RepoPath,
    pub tutorial: RepoPath,
    pub it_checklist: RepoPath,
    pub pr_workflow: RepoPath,
    pub scheduled_workflow: RepoPath,
    /// Also check action pins in every other file under `.github/workflows`.
    pub scan_all_workflows: bool,
    pub layout: Vec<RepoPath>,
}

impl Default for DocumentPaths {
    fn default() -> Self {
        Self {
            settings: RepoPath::new(".claude/settings.json"),
            ownership: RepoPath::new("CODEOWNERS"),
            guidance: RepoPath::new("CLAUDE.md"),
            tutorial: RepoPath::new("ops/tutorial.md"),
            it_checklist: RepoPath::new("ops/it-checklist.md"),
            pr_workflow: RepoPath::new(".github/workflows/pr-checks.yml"),
            scheduled_workflow: RepoPath::new(".github/workflows/scheduled-run.yml"),
            scan_all_workflows: false,
            layout: DEFAULT_LAYOUT.iter().map(RepoPath::new).collect(),
        }
    }
}

impl DocumentPaths {
    pub fn is_named_workflow(&self, path: &RepoPath) -> bool {
        *path == self.pr_workflow || *path == self.scheduled_workflow
    }
}

/// Everything the checks read, loaded up front by the repo adapter.
#[derive(Clone, Debug, Default)]
pub struct RepoModel {
    pub repo_root: RepoPath,

    /// Agent settings (`.claude/settings.json`).
    pub settings: SourceDoc,
    /// `CODEOWNERS`.
    pub ownership: SourceDoc,
    /// Project guidance (`CLAUDE.md`).
    pub guidance: SourceDoc,
    /// Paired documents embedding the managed-settings block.
    pub tutorial: SourceDoc,
    pub it_checklist: SourceDoc,
    pub pr_workflow: SourceDoc,
    pub scheduled_workflow: SourceDoc,

    /// Other workflow files, only consulted for action pins.
    pub extra_workflows: Vec<SourceDoc>,

    /// Scaffold directories and whether they exist.
    pub layout: Vec<DirEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceDoc {
    pub path: RepoPath,
    pub state: DocState,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DocState {
    Loaded(String),
    #[default]
    Missing,
    /// Exists but could not be read; the reason is kept for the finding.
    Unreadable(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub path: RepoPath,
    pub exists: bool,
}

impl SourceDoc {
    pub fn loaded(path: impl AsRef<str>, text: impl Into<String>) -> Self {
        Self {
            path: RepoPath::new(path),
            state: DocState::Loaded(text.into()),
        }
    }

    pub fn missing(path: impl AsRef<str>) -> Self {
        Self {
            path: RepoPath::new(path),
            state: DocState::Missing,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.state {
            DocState::Loaded(text) => Some(text),
            _ => None,
        }
    }

    /// True when the file is present on disk, readable or not.
    pub fn exists(&self) -> bool {
        !matches!(self.state, DocState::Missing)
    }
}

impl RepoModel {
    /// The seven documents every repository must carry.
    pub fn required_documents(&self) -> [&SourceDoc; 7] {
        [
            &self.settings,
            &self.ownership,
            &self.guidance,
            &self.tutorial,
            &self.it_checklist,
            &self.pr_workflow,
            &self.scheduled_workflow,
        ]
    }

    pub fn paired_documents(&self) -> [&SourceDoc; 2] {
        [&self.tutorial, &self.it_checklist]
    }

    pub fn workflows(&self) -> [&SourceDoc; 2] {
        [&self.pr_workflow, &self.scheduled_workflow]
    }

    /// Named workflows followed by any extra discovered ones.
    pub fn all_workflows(&self) -> impl Iterator<Item = &SourceDoc> {
        self.workflows().into_iter().chain(self.extra_workflows.iter())
    }

    pub fn documents_scanned(&self) -> u32 {
        self.required_documents()
            .into_iter()
            .chain(self.extra_workflows.iter())
            .filter(|d| d.text().is_some())
            .count() as u32
    }
}
