//! Plain-text path lists: one relative path per line.
//!
//! Used both as the `--input` source that bypasses [`PathFilter`](crate::PathFilter)
//! and as the persisted attention list.

use std::io::Write;
use std::path::Path;

use crate::error::{io_err, ConfigError};
use crate::types::RelativePath;

/// Read a path list. Blank lines and `#` comments are skipped.
pub fn read_path_list(path: &Path) -> Result<Vec<RelativePath>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse_path_list(path, &contents)
}

fn parse_path_list(origin: &Path, contents: &str) -> Result<Vec<RelativePath>, ConfigError> {
    let mut paths = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let rel = RelativePath::parse(line).map_err(|source| ConfigError::InvalidListEntry {
            path: origin.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        paths.push(rel);
    }
    Ok(paths)
}

/// Atomically write a path list, one entry per line, in the given order.
///
/// Writes to `<path>.tmp`, flushes, then renames over `path`.
pub fn write_path_list(path: &Path, paths: &[RelativePath]) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp_name);

    let file = std::fs::File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
    let mut writer = std::io::BufWriter::new(file);
    for rel in paths {
        writeln!(writer, "{rel}").map_err(|e| io_err(&tmp, e))?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| io_err(&tmp, e.into_error()))?;
    file.sync_all().map_err(|e| io_err(&tmp, e))?;
    drop(file);

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use tempfile::TempDir;

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let paths = parse_path_list(Path::new("list.txt"), "a.css\n\n# note\n ./b.php \r\n")
            .expect("parse");
        let names: Vec<&str> = paths.iter().map(RelativePath::as_str).collect();
        assert_eq!(names, ["a.css", "b.php"]);
    }

    #[test]
    fn bad_line_reports_line_number() {
        let err = parse_path_list(Path::new("list.txt"), "a.css\n../etc/passwd\n").unwrap_err();
        match err {
            ConfigError::InvalidListEntry { line, source, .. } => {
                assert_eq!(line, 2);
                assert!(matches!(source, PathError::ParentSegment(_)));
            }
            other => panic!("expected InvalidListEntry, got {other:?}"),
        }
    }

    #[test]
    fn write_then_read_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("list.txt");
        let paths: Vec<RelativePath> = ["z.php", "a.css"]
            .iter()
            .map(|s| RelativePath::parse(s).unwrap())
            .collect();

        write_path_list(&path, &paths).expect("write");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "z.php\na.css\n");
        assert!(!tmp.path().join("out").join("list.txt.tmp").exists());
        assert_eq!(read_path_list(&path).expect("read"), paths);
    }

    #[test]
    fn unreadable_list_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_path_list(&tmp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
