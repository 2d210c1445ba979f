//! Config file + command-line flag merge.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use drift_core::{config, Settings};

/// Workspace selection flags shared by `check`, `list` and `diff`.
///
/// Every flag is optional; an unset flag keeps the config file's value.
#[derive(Args, Debug, Default, Clone)]
pub struct WorkspaceArgs {
    /// Remote host for `ssh <host> -s sftp`, or `file://` for a local directory.
    #[arg(short = 't', long, value_name = "HOST")]
    pub target: Option<String>,

    /// Local workspace root.
    #[arg(short = 'l', long = "local", value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// Remote workspace root.
    #[arg(short = 'r', long = "remote", value_name = "DIR")]
    pub remote_root: Option<String>,

    /// Included extensions (repeatable or comma-separated).
    #[arg(long = "ext", value_delimiter = ',', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Excluded extensions (repeatable or comma-separated).
    #[arg(long = "exclude-ext", value_delimiter = ',', value_name = "EXT")]
    pub exclude_extensions: Vec<String>,

    /// Excluded directories relative to the local root (repeatable).
    #[arg(long = "exclude-dir", value_name = "DIR")]
    pub exclude_dirs: Vec<String>,

    /// Scratch directory for staged copies.
    #[arg(long, value_name = "DIR")]
    pub stage_dir: Option<PathBuf>,

    /// Treat CRLF and LF line endings as equal.
    #[arg(long)]
    pub ignore_eol: bool,
}

impl WorkspaceArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(target) = &self.target {
            settings.target = Some(target.clone());
        }
        if let Some(local) = &self.local_root {
            settings.local_root = local.clone();
        }
        if let Some(remote) = &self.remote_root {
            settings.remote_root = remote.clone();
        }
        if !self.extensions.is_empty() {
            settings.extensions = self.extensions.clone();
        }
        if !self.exclude_extensions.is_empty() {
            settings.exclude_extensions = self.exclude_extensions.clone();
        }
        if !self.exclude_dirs.is_empty() {
            settings.exclude_dirs = self.exclude_dirs.clone();
        }
        if let Some(stage) = &self.stage_dir {
            settings.stage_dir = stage.clone();
        }
        if self.ignore_eol {
            settings.ignore_line_endings = true;
        }
    }
}

/// Load `--config <file>` (which must exist) or `~/.drift/config.yaml`.
pub fn load(config_file: Option<&Path>) -> Result<Settings> {
    match config_file {
        Some(path) => {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            config::load_file(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))
        }
        None => config::load().context("failed to load ~/.drift/config.yaml"),
    }
}

/// Settings after layering `args` over the config file.
pub fn resolve(config_file: Option<&Path>, args: &WorkspaceArgs) -> Result<Settings> {
    let mut settings = load(config_file)?;
    args.apply(&mut settings);
    tracing::debug!(?settings, "resolved settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_keep_config_values() {
        let mut settings = Settings {
            target: Some("web01".into()),
            concurrency: 9,
            ..Settings::default()
        };
        WorkspaceArgs::default().apply(&mut settings);
        assert_eq!(settings.target.as_deref(), Some("web01"));
        assert_eq!(settings.extensions, Settings::default().extensions);
    }

    #[test]
    fn flags_override_config_values() {
        let mut settings = Settings::default();
        let args = WorkspaceArgs {
            target: Some("file://".into()),
            remote_root: Some("/srv/site".into()),
            extensions: vec!["php".into()],
            ignore_eol: true,
            ..WorkspaceArgs::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.target.as_deref(), Some("file://"));
        assert_eq!(settings.remote_root, "/srv/site");
        assert_eq!(settings.extensions, ["php"]);
        assert!(settings.ignore_line_endings);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load(Some(&tmp.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
