//! Error types for drift-core.

use std::path::PathBuf;

use thiserror::Error;

/// A path entry that cannot be used as a [`RelativePath`](crate::RelativePath).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("absolute path not allowed: {0}")]
    Absolute(String),

    #[error("parent segment '..' not allowed: {0}")]
    ParentSegment(String),
}

/// All errors that can arise before a reconciliation run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.drift/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("no target specified; pass '-t <host>' or set `target` in the config file")]
    MissingTarget,

    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,

    /// A line of an input path list could not be parsed.
    #[error("invalid entry at {path}:{line}: {source}")]
    InvalidListEntry {
        path: PathBuf,
        line: usize,
        #[source]
        source: PathError,
    },

    /// The local workspace root passed to the path filter is not a directory.
    #[error("local workspace is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
