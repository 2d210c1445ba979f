//! YAML settings for `drift`.
//!
//! # Storage layout
//!
//! ```text
//! ~/.drift/
//!   config.yaml   (mode 0600, written by `drift init`)
//! ```
//!
//! A missing file is not an error: [`load_at`] returns [`Settings::default`].
//! Command-line flags are layered on top by the CLI.
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Default worker ceiling.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Prefix that selects the local-filesystem store instead of ssh.
pub const FILE_TARGET_PREFIX: &str = "file://";

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Where the remote workspace lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Reached through `ssh <host> -s sftp`.
    Ssh { host: String },
    /// The remote root is a directory on this machine (`file://`).
    LocalFs,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        if raw.starts_with(FILE_TARGET_PREFIX) {
            return Ok(Target::LocalFs);
        }
        Ok(Target::Ssh {
            host: raw.to_string(),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Ssh { host } => write!(f, "ssh://{host}"),
            Target::LocalFs => f.write_str(FILE_TARGET_PREFIX),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Every knob a reconciliation run reads. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub local_root: PathBuf,
    pub remote_root: String,
    /// Included extensions without the leading dot. Empty means "all".
    pub extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
    /// Directories (relative, slash-separated) skipped by the path filter.
    pub exclude_dirs: Vec<String>,
    pub concurrency: usize,
    pub stage_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub ignore_line_endings: bool,
    pub ssh_command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: None,
            local_root: PathBuf::from("."),
            remote_root: "/var/www/html".to_string(),
            extensions: to_strings(&["php", "tpl", "js", "css", "html"]),
            exclude_extensions: to_strings(&["sql", "gz", "zip"]),
            exclude_dirs: to_strings(&[
                "data/Smarty/templates_c",
                "data/class/api/operations",
                "data/class/api",
                "data/class_extends/api_extends",
                "data/downloads",
                "data/download",
                "data/module",
                "data/plugin",
                "data/smarty_extends",
            ]),
            concurrency: DEFAULT_CONCURRENCY,
            stage_dir: PathBuf::from(".drift-stage"),
            output: None,
            ignore_line_endings: false,
            ssh_command: "ssh".to_string(),
            ssh_args: Vec::new(),
        }
    }
}

impl Settings {
    /// The parsed target, or [`ConfigError::MissingTarget`].
    pub fn target(&self) -> Result<Target, ConfigError> {
        match self.target.as_deref() {
            Some(raw) => Target::parse(raw),
            None => Err(ConfigError::MissingTarget),
        }
    }

    /// The worker ceiling as a non-zero count.
    pub fn concurrency_limit(&self) -> Result<std::num::NonZeroUsize, ConfigError> {
        std::num::NonZeroUsize::new(self.concurrency).ok_or(ConfigError::InvalidConcurrency)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.drift/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".drift").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load settings from an explicit file. A missing file yields the defaults.
///
/// Returns `ConfigError::Parse` (with path + line context) for malformed YAML.
pub fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `<home>/.drift/config.yaml`.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    load_file(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save settings to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_file(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let yaml = serde_yaml::to_string(settings)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write a default config at `<home>/.drift/config.yaml`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
/// The returned flag is `true` when a new file was written.
pub fn init_at(home: &Path, target: Option<String>) -> Result<(Settings, bool), ConfigError> {
    let path = config_path_at(home);
    if path.exists() {
        return Ok((load_file(&path)?, false));
    }
    let settings = Settings {
        target,
        ..Settings::default()
    };
    save_file(&path, &settings)?;
    Ok((settings, true))
}

/// `init_at` convenience wrapper.
pub fn init(target: Option<String>) -> Result<(Settings, bool), ConfigError> {
    init_at(&home()?, target)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
