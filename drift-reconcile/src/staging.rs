//! Staging area: two scratch trees mirroring the relative layout.
//!
//! ```text
//! <base>/
//!   local/<relative path>    copies of local sources
//!   remote/<relative path>   downloads of remote sources
//! ```
//!
//! Each worker writes only below its own relative path, so staging writes
//! need no locking as long as a run never schedules the same path twice.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use drift_core::RelativePath;
use drift_remote::RemoteFileStore;

use crate::error::{stage_io_err, ReconcileError, StageError};

pub const LOCAL_DIR: &str = "local";
pub const REMOTE_DIR: &str = "remote";

#[derive(Debug, Clone)]
pub struct StagingArea {
    base: PathBuf,
    local_root: PathBuf,
    remote_root: PathBuf,
}

impl StagingArea {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            local_root: base.join(LOCAL_DIR),
            remote_root: base.join(REMOTE_DIR),
            base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn remote_root(&self) -> &Path {
        &self.remote_root
    }

    /// Where the local copy of `path` lands.
    pub fn local_copy(&self, path: &RelativePath) -> PathBuf {
        path.to_path_under(&self.local_root)
    }

    /// Where the remote copy of `path` lands.
    pub fn remote_copy(&self, path: &RelativePath) -> PathBuf {
        path.to_path_under(&self.remote_root)
    }

    /// Remove both roots if present and recreate them empty.
    pub async fn reset(&self) -> Result<(), ReconcileError> {
        for root in [&self.local_root, &self.remote_root] {
            match tokio::fs::remove_dir_all(root).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ReconcileError::Staging {
                        path: root.clone(),
                        source,
                    })
                }
            }
            tokio::fs::create_dir_all(root)
                .await
                .map_err(|source| ReconcileError::Staging {
                    path: root.clone(),
                    source,
                })?;
        }
        tracing::debug!(base = %self.base.display(), "staging area reset");
        Ok(())
    }

    /// Copy `<local_root>/<path>` byte for byte into the local staging tree.
    pub async fn materialize_local(
        &self,
        local_root: &Path,
        path: &RelativePath,
    ) -> Result<PathBuf, StageError> {
        let source = path.to_path_under(local_root);
        let meta = tokio::fs::metadata(&source)
            .await
            .map_err(|e| stage_io_err(&source, e))?;
        if meta.is_dir() {
            return Err(StageError::NotAFile {
                location: source.display().to_string(),
            });
        }

        let dest = self.local_copy(path);
        ensure_parent(&dest).await?;
        tokio::fs::copy(&source, &dest)
            .await
            .map_err(|e| stage_io_err(&source, e))?;
        Ok(dest)
    }

    /// Download `<remote_root>/<path>` from `store` into the remote staging tree.
    pub async fn materialize_remote(
        &self,
        store: &dyn RemoteFileStore,
        remote_root: &str,
        path: &RelativePath,
    ) -> Result<PathBuf, StageError> {
        let location = path.to_remote_under(remote_root);
        let meta = store.stat(&location).await?;
        if meta.is_dir {
            return Err(StageError::NotAFile { location });
        }
        let mut reader = store.open_read(&location).await?;

        let dest = self.remote_copy(path);
        ensure_parent(&dest).await?;
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|source| StageError::Io {
                path: dest.clone(),
                source,
            })?;

        let copied = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(n) => file.flush().await.map(|()| n).map_err(|source| StageError::Io {
                path: dest.clone(),
                source,
            }),
            Err(source) => Err(StageError::Stream {
                location: location.clone(),
                source,
            }),
        };
        drop(file);
        let copied = match copied {
            Ok(n) => n,
            Err(err) => {
                // No partial download may stand in for the remote file.
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(err);
            }
        };
        tracing::trace!(location = %location, bytes = copied, "downloaded");
        Ok(dest)
    }
}

async fn ensure_parent(dest: &Path) -> Result<(), StageError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}
