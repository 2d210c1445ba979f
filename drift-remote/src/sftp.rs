//! SFTP store over an `ssh <host> -s sftp` child process.
//!
//! The ssh client owns authentication, host keys and multiplexing; this
//! module only speaks SFTP over the child's stdin/stdout. The session
//! multiplexes requests by id, so concurrent `stat`/`open_read` calls from
//! several workers are served in parallel over the one pipe.

use std::process::Stdio;

use async_trait::async_trait;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::StatusCode;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use drift_core::Settings;

use crate::error::RemoteError;
use crate::store::{RemoteFileStore, RemoteMetadata, RemoteReader};

/// How to launch the ssh client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshOptions {
    pub command: String,
    /// Extra arguments placed before the host (e.g. `-p 2222`, `-F cfg`).
    pub args: Vec<String>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            command: "ssh".to_string(),
            args: Vec::new(),
        }
    }
}

impl SshOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            command: settings.ssh_command.clone(),
            args: settings.ssh_args.clone(),
        }
    }
}

pub struct SftpStore {
    host: String,
    session: SftpSession,
    child: Mutex<Child>,
}

impl SftpStore {
    /// Spawn ssh and run the SFTP version handshake over its pipes.
    pub async fn connect(host: &str, ssh: &SshOptions) -> Result<Self, RemoteError> {
        let mut child = Command::new(&ssh.command)
            .args(&ssh.args)
            .arg(host)
            .args(["-s", "sftp"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RemoteError::Session(format!("failed to spawn '{}': {e}", ssh.command)))?;

        let (Some(stdout), Some(stdin)) = (child.stdout.take(), child.stdin.take()) else {
            return Err(RemoteError::Session("ssh child has no stdio pipes".to_string()));
        };

        let session = match SftpSession::new(tokio::io::join(stdout, stdin)).await {
            Ok(session) => session,
            Err(err) => {
                let status = child
                    .try_wait()
                    .ok()
                    .flatten()
                    .map(|s| format!(" (ssh exited with {s})"))
                    .unwrap_or_default();
                return Err(RemoteError::Session(format!(
                    "SFTP handshake with {host} failed: {err}{status}"
                )));
            }
        };

        tracing::info!(host = %host, "sftp session established");
        Ok(Self {
            host: host.to_string(),
            session,
            child: Mutex::new(child),
        })
    }
}

#[async_trait]
impl RemoteFileStore for SftpStore {
    fn describe(&self) -> String {
        format!("ssh://{}", self.host)
    }

    async fn stat(&self, path: &str) -> Result<RemoteMetadata, RemoteError> {
        let attrs = self
            .session
            .metadata(path)
            .await
            .map_err(|e| map_sftp_err(path, e))?;
        Ok(RemoteMetadata {
            is_dir: attrs.is_dir(),
            len: attrs.size,
        })
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError> {
        let file = self
            .session
            .open(path)
            .await
            .map_err(|e| map_sftp_err(path, e))?;
        Ok(Box::new(file))
    }

    async fn close(&self) -> Result<(), RemoteError> {
        if let Err(err) = self.session.close().await {
            tracing::debug!(error = %err, "sftp close failed");
        }
        let mut child = self.child.lock().await;
        // ssh exits once the subsystem channel closes; kill it if it lingers.
        match tokio::time::timeout(std::time::Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "ssh exited"),
            Ok(Err(err)) => return Err(RemoteError::Session(format!("waiting for ssh: {err}"))),
            Err(_) => {
                tracing::warn!(host = %self.host, "ssh did not exit, killing it");
                child
                    .kill()
                    .await
                    .map_err(|e| RemoteError::Session(format!("killing ssh: {e}")))?;
            }
        }
        Ok(())
    }
}

/// `SSH_FX_NO_SUCH_FILE` becomes `NotFound`; everything else is a transport failure.
fn map_sftp_err(path: &str, err: SftpError) -> RemoteError {
    match err {
        SftpError::Status(status) if status.status_code == StatusCode::NoSuchFile => {
            RemoteError::NotFound {
                path: path.to_string(),
            }
        }
        other => RemoteError::Transport {
            path: path.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh_sftp::protocol::Status;

    fn status(code: StatusCode) -> SftpError {
        SftpError::Status(Status {
            id: 0,
            status_code: code,
            error_message: "server says no".to_string(),
            language_tag: "en-US".to_string(),
        })
    }

    #[test]
    fn no_such_file_maps_to_not_found() {
        let err = map_sftp_err("/var/www/html/c.js", status(StatusCode::NoSuchFile));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/var/www/html/c.js"));
    }

    #[test]
    fn other_statuses_are_transport_errors() {
        let err = map_sftp_err("/srv/a.php", status(StatusCode::PermissionDenied));
        assert!(matches!(err, RemoteError::Transport { .. }), "got: {err}");
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn missing_ssh_binary_is_session_error() {
        let opts = SshOptions {
            command: "/nonexistent/drift-test-ssh".to_string(),
            args: vec![],
        };
        match SftpStore::connect("example.invalid", &opts).await {
            Err(RemoteError::Session(msg)) => assert!(msg.contains("spawn")),
            Err(other) => panic!("expected session error, got {other}"),
            Ok(_) => panic!("connect should fail without an ssh binary"),
        }
    }

    #[test]
    fn options_follow_settings() {
        let settings = Settings {
            ssh_command: "/usr/bin/ssh".into(),
            ssh_args: vec!["-p".into(), "2222".into()],
            ..Settings::default()
        };
        let opts = SshOptions::from_settings(&settings);
        assert_eq!(opts.command, "/usr/bin/ssh");
        assert_eq!(opts.args, ["-p", "2222"]);
    }
}
