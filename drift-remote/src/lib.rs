//! # drift-remote
//!
//! Read-only access to the remote workspace.
//!
//! [`RemoteFileStore`] is the seam the reconciliation engine consumes. Two
//! implementations ship here:
//! - [`SftpStore`] — SFTP spoken over the pipes of an `ssh <host> -s sftp`
//!   child process, so authentication is whatever the user's ssh client does
//! - [`DirStore`] — a directory on this machine, selected with `file://`
//!
//! Call [`connect`] to open the store a [`Target`](drift_core::Target) names.

pub mod dir;
pub mod error;
pub mod sftp;
pub mod store;

use std::sync::Arc;

use drift_core::Target;

pub use dir::DirStore;
pub use error::RemoteError;
pub use sftp::{SftpStore, SshOptions};
pub use store::{RemoteFileStore, RemoteMetadata, RemoteReader};

/// Open the store for `target`.
///
/// This is the transport-session step: a failure here is fatal for the run.
pub async fn connect(
    target: &Target,
    ssh: &SshOptions,
) -> Result<Arc<dyn RemoteFileStore>, RemoteError> {
    match target {
        Target::LocalFs => Ok(Arc::new(DirStore::new())),
        Target::Ssh { host } => Ok(Arc::new(SftpStore::connect(host, ssh).await?)),
    }
}
