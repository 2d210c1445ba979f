//! The remote store contract.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::RemoteError;

/// A readable remote file.
pub type RemoteReader = Box<dyn AsyncRead + Send + Unpin>;

/// What `stat` reports about a remote path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub is_dir: bool,
    pub len: Option<u64>,
}

/// Read-only view of the remote workspace.
///
/// One store is shared by every worker. Implementations decide whether
/// concurrent requests run in parallel or are serialized; callers issue at
/// most one request per worker at a time and never assume any ordering
/// between workers.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Short label for logs (`ssh://host`, `file://`).
    fn describe(&self) -> String;

    async fn stat(&self, path: &str) -> Result<RemoteMetadata, RemoteError>;

    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError>;

    /// Tear the session down. The default does nothing.
    async fn close(&self) -> Result<(), RemoteError> {
        Ok(())
    }
}
