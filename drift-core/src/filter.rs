//! Path selection for a local workspace.
//!
//! [`PathFilter::collect`] walks the workspace in lexicographic order and
//! yields every regular file whose last extension passes the include and
//! exclude lists and that does not sit under an excluded directory.

use std::collections::HashSet;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::{io_err, ConfigError};
use crate::types::RelativePath;
use crate::Settings;

/// Compiled inclusion and exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include_exts: HashSet<String>,
    exclude_exts: HashSet<String>,
    exclude_dirs: Vec<RelativePath>,
}

impl PathFilter {
    /// Build a filter. An empty include list means "every extension".
    ///
    /// Extensions are accepted with or without a leading dot. Excluded
    /// directory entries that are not valid relative paths are ignored.
    pub fn new(include: &[String], exclude: &[String], exclude_dirs: &[String]) -> Self {
        let exclude_dirs = exclude_dirs
            .iter()
            .filter_map(|d| match RelativePath::parse(d) {
                Ok(p) => Some(p),
                Err(err) => {
                    tracing::warn!(dir = %d, error = %err, "ignoring excluded directory");
                    None
                }
            })
            .collect();
        Self {
            include_exts: normalize_exts(include),
            exclude_exts: normalize_exts(exclude),
            exclude_dirs,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.extensions,
            &settings.exclude_extensions,
            &settings.exclude_dirs,
        )
    }

    /// Whether a file path (relative, slash-separated) passes the extension rules.
    pub fn accepts(&self, path: &RelativePath) -> bool {
        let ext = last_extension(path.as_str());
        if !self.include_exts.is_empty() {
            match ext {
                Some(ext) if self.include_exts.contains(ext) => {}
                _ => return false,
            }
        }
        !matches!(ext, Some(ext) if self.exclude_exts.contains(ext))
    }

    /// Whether a directory (relative, slash-separated) is excluded, along with
    /// everything below it.
    pub fn excludes_dir(&self, dir: &RelativePath) -> bool {
        self.exclude_dirs.iter().any(|excluded| {
            dir == excluded
                || dir
                    .as_str()
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with(RelativePath::SEPARATOR))
        })
    }

    /// Walk `root` and return the accepted files in walk order.
    pub fn collect(&self, root: &Path) -> Result<Vec<RelativePath>, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_entry(root, entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    match err.into_io_error() {
                        Some(source) => return Err(io_err(path, source)),
                        None => {
                            tracing::warn!(path = %path.display(), "skipping filesystem loop");
                            continue;
                        }
                    }
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = relative_of(root, entry.path()) else {
                tracing::warn!(
                    path = %entry.path().display(),
                    "skipping file whose name is not valid UTF-8"
                );
                continue;
            };
            if self.accepts(&rel) {
                files.push(rel);
            }
        }
        tracing::debug!(root = %root.display(), count = files.len(), "collected paths");
        Ok(files)
    }

    fn is_excluded_entry(&self, root: &Path, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() || self.exclude_dirs.is_empty() {
            return false;
        }
        relative_of(root, entry.path()).is_some_and(|rel| self.excludes_dir(&rel))
    }
}

fn normalize_exts(exts: &[String]) -> HashSet<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Text after the final dot of the file name, if any (`a.tar.gz` → `gz`).
fn last_extension(path: &str) -> Option<&str> {
    let name = path.rsplit(RelativePath::SEPARATOR).next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// `None` when any segment is not UTF-8; a lossy name would not match the file.
fn relative_of(root: &Path, path: &Path) -> Option<RelativePath> {
    let rel = path.strip_prefix(root).ok()?;
    let segments = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    RelativePath::parse(&segments.join("/")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rel(s: &str) -> RelativePath {
        RelativePath::parse(s).unwrap()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn extension_rules() {
        let filter = PathFilter::new(&strings(&["php", ".css"]), &strings(&["gz"]), &[]);
        assert!(filter.accepts(&rel("index.php")));
        assert!(filter.accepts(&rel("css/site.css")));
        assert!(!filter.accepts(&rel("README")));
        assert!(!filter.accepts(&rel("dump.sql")));

        let open = PathFilter::new(&[], &strings(&["gz"]), &[]);
        assert!(open.accepts(&rel("README")));
        assert!(!open.accepts(&rel("backup.tar.gz")));
    }

    #[test]
    fn dotfiles_have_no_extension() {
        assert_eq!(last_extension(".htaccess"), None);
        assert_eq!(last_extension("dir/a.tar.gz"), Some("gz"));
        assert_eq!(last_extension("dir.d/Makefile"), None);
    }

    #[test]
    fn excluded_dirs_match_whole_segments() {
        let filter = PathFilter::new(&[], &[], &strings(&["data/plugin"]));
        assert!(filter.excludes_dir(&rel("data/plugin")));
        assert!(filter.excludes_dir(&rel("data/plugin/x")));
        assert!(!filter.excludes_dir(&rel("data/plugins")));
    }

    #[test]
    fn collect_walks_sorted_and_skips_excluded() {
        let tmp = TempDir::new().unwrap();
        for f in [
            "b.php",
            "a.css",
            "html/js/app.js",
            "data/plugin/skip.php",
            "data/keep.tpl",
            "notes.txt",
        ] {
            touch(tmp.path(), f);
        }

        let filter = PathFilter::new(
            &strings(&["php", "tpl", "js", "css"]),
            &[],
            &strings(&["data/plugin"]),
        );
        let files: Vec<String> = filter
            .collect(tmp.path())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(files, ["a.css", "b.php", "data/keep.tpl", "html/js/app.js"]);
    }

    #[test]
    fn collect_keeps_whitespace_in_names() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "x.php ");
        touch(tmp.path(), "y.php");

        let files: Vec<String> = PathFilter::default()
            .collect(tmp.path())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(files, ["x.php ", "y.php"]);
        assert!(rel("x.php ").to_path_under(tmp.path()).is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn collect_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(OsStr::from_bytes(b"caf\xe9.php")), "x").unwrap();
        touch(tmp.path(), "menu.php");

        let files: Vec<String> = PathFilter::new(&strings(&["php"]), &[], &[])
            .collect(tmp.path())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(files, ["menu.php"]);
    }

    #[test]
    fn collect_on_missing_root_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = PathFilter::default()
            .collect(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory { .. }));
    }
}
