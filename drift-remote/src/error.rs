//! Error types for drift-remote.

use thiserror::Error;

/// Failures of the remote side. `NotFound` is a classification signal, every
/// other variant is a transport failure.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote path does not exist.
    #[error("not found on remote: {path}")]
    NotFound { path: String },

    /// A request on an established session failed.
    #[error("transport error at {path}: {message}")]
    Transport { path: String, message: String },

    /// The session itself could not be established or has died.
    #[error("remote session error: {0}")]
    Session(String),

    /// Local I/O while driving the transport (spawning ssh, reading a `file://` tree).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }
}

/// Whether a local I/O error means the path does not exist. A file standing
/// where a parent directory should be (`ENOTDIR`) counts, as it does for SFTP.
pub fn is_absent(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

/// Map a local I/O error to `NotFound` or `Io`.
pub(crate) fn io_err(path: impl Into<String>, source: std::io::Error) -> RemoteError {
    let path = path.into();
    if is_absent(&source) {
        RemoteError::NotFound { path }
    } else {
        RemoteError::Io { path, source }
    }
}
