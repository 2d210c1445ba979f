//! Error types for drift-reconcile.

use std::path::PathBuf;

use thiserror::Error;

use drift_core::{ConfigError, RelativePath};
use drift_remote::RemoteError;

/// Fatal errors: any of these aborts a run before (or instead of) a report.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The staging roots could not be wiped or recreated.
    #[error("cannot reset staging area at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Both sides were staged and differ, but the copies could not be diffed.
    #[error("cannot diff {path}: {source}")]
    Diff {
        path: RelativePath,
        #[source]
        source: CompareError,
    },

    /// JSON rendering of a report failed.
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why one side of one path could not be staged. Never fatal to the run.
#[derive(Debug, Error)]
pub enum StageError {
    /// The source does not exist on this side.
    #[error("not found: {location}")]
    NotFound { location: String },

    /// The source exists but is a directory.
    #[error("not a regular file: {location}")]
    NotAFile { location: String },

    /// Local filesystem failure while reading the source or writing the copy.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote byte stream broke mid-transfer.
    #[error("failed to stream {location}: {source}")]
    Stream {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote store refused a request.
    #[error("{0}")]
    Remote(RemoteError),
}

impl StageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StageError::NotFound { .. })
    }
}

impl From<RemoteError> for StageError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound { path } => StageError::NotFound { location: path },
            other => StageError::Remote(other),
        }
    }
}

/// Why a comparator could not decide.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("staged file missing at compare time: {path}")]
    Missing { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Local I/O error for staging; an absent source keeps its classification meaning.
pub(crate) fn stage_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StageError {
    let path = path.into();
    if drift_remote::error::is_absent(&source) {
        StageError::NotFound {
            location: path.display().to_string(),
        }
    } else {
        StageError::Io { path, source }
    }
}

pub(crate) fn compare_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CompareError {
    let path = path.into();
    if source.kind() == std::io::ErrorKind::NotFound {
        CompareError::Missing { path }
    } else {
        CompareError::Io { path, source }
    }
}
