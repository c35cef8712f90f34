use camino::{Utf8Path, Utf8PathBuf};
use policyguard_domain::model::{DocState, SourceDoc};
use policyguard_types::RepoPath;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Why a document that exists could not be turned into text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{path}: is a directory, not a file")]
    NotAFile { path: Utf8PathBuf },

    #[error("{path}: not valid UTF-8")]
    InvalidUtf8 {
        path: Utf8PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("{path}: read failed")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Short cause without the path; the finding message already names the document.
    pub fn reason(&self) -> String {
        match self {
            LoadError::NotAFile { .. } => "is a directory, not a file".to_string(),
            LoadError::InvalidUtf8 { source, .. } => format!("not valid UTF-8 ({source})"),
            LoadError::Io { source, .. } => source.to_string(),
        }
    }
}

/// `Ok(None)` when the file does not exist.
pub fn read_text(abs: &Utf8Path) -> Result<Option<String>, LoadError> {
    let meta = match std::fs::metadata(abs) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Io {
                path: abs.to_owned(),
                source,
            });
        }
    };
    if meta.is_dir() {
        return Err(LoadError::NotAFile {
            path: abs.to_owned(),
        });
    }

    let bytes = std::fs::read(abs).map_err(|source| LoadError::Io {
        path: abs.to_owned(),
        source,
    })?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|source| LoadError::InvalidUtf8 {
            path: abs.to_owned(),
            source,
        })
}

/// Read one document, folding load failures into its state.
pub fn load_document(repo_root: &Utf8Path, path: &RepoPath) -> SourceDoc {
    let abs = repo_root.join(path.as_str());
    let state = match read_text(&abs) {
        Ok(Some(text)) => DocState::Loaded(text),
        Ok(None) => DocState::Missing,
        Err(err) => {
            tracing::warn!(error = %err, "document unreadable");
            DocState::Unreadable(err.reason())
        }
    };
    let label = match &state {
        DocState::Loaded(_) => "loaded",
        DocState::Missing => "missing",
        DocState::Unreadable(_) => "unreadable",
    };
    tracing::debug!(document = %path, state = label, "read document");
    SourceDoc {
        path: path.clone(),
        state,
    }
}
