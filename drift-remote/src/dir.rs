//! `file://` store: the remote workspace is a directory on this machine.
//!
//! Useful for comparing against a mounted share or a second checkout, and
//! the store the integration tests drive.

use async_trait::async_trait;

use crate::error::{io_err, RemoteError};
use crate::store::{RemoteFileStore, RemoteMetadata, RemoteReader};

#[derive(Debug, Clone, Default)]
pub struct DirStore;

impl DirStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteFileStore for DirStore {
    fn describe(&self) -> String {
        drift_core::config::FILE_TARGET_PREFIX.to_string()
    }

    async fn stat(&self, path: &str) -> Result<RemoteMetadata, RemoteError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| io_err(path, e))?;
        Ok(RemoteMetadata {
            is_dir: meta.is_dir(),
            len: Some(meta.len()),
        })
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| io_err(path, e))?;
        Ok(Box::new(file))
    }
}
