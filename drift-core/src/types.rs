//! Domain types for a reconciliation run.
//!
//! A [`RelativePath`] is the correlation key between the local and remote
//! workspaces. Each worker turns one path into one [`ReconciliationResult`],
//! whose [`Classification`] decides whether the path needs attention.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

// ---------------------------------------------------------------------------
// RelativePath
// ---------------------------------------------------------------------------

/// Slash-separated path identifying a file under both workspace roots.
///
/// Normalized on construction: a leading `./`, `.` segments and empty
/// segments are dropped. Whitespace is part of the name and kept as is.
/// Absolute paths and `..` segments are rejected so a staged copy can never
/// land outside its staging root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    pub const SEPARATOR: char = '/';

    /// Parse and normalize a slash-separated relative path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if raw.starts_with(Self::SEPARATOR) || Path::new(raw).has_root() {
            return Err(PathError::Absolute(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in raw.split(Self::SEPARATOR) {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::ParentSegment(raw.to_string())),
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR)
    }

    /// Host path of this entry below `root`, built segment by segment.
    pub fn to_path_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.segments());
        path
    }

    /// Remote path of this entry below `root`, always joined with `/`.
    pub fn to_remote_under(&self, root: &str) -> String {
        let trimmed = root.trim_end_matches(Self::SEPARATOR);
        match (trimmed.is_empty(), root.starts_with(Self::SEPARATOR)) {
            (true, true) => format!("/{}", self.0),
            (true, false) => self.0.clone(),
            (false, _) => format!("{trimmed}/{}", self.0),
        }
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RelativePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RelativePath> for String {
    fn from(p: RelativePath) -> Self {
        p.0
    }
}

// ---------------------------------------------------------------------------
// Per-side availability and comparison outcome
// ---------------------------------------------------------------------------

/// Why one side of a path is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCause {
    NotFoundLocally,
    NotFoundRemotely,
}

/// State of one side (local or remote) after staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum SideAvailability {
    /// Staged successfully at this path.
    Available(PathBuf),
    /// The source does not exist on this side.
    Missing(MissingCause),
    /// Copy, download, or transport failure while staging.
    Failed(String),
}

impl SideAvailability {
    pub fn staged_path(&self) -> Option<&Path> {
        match self {
            SideAvailability::Available(path) => Some(path),
            _ => None,
        }
    }
}

/// Result of comparing two staged files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum ComparisonOutcome {
    Identical,
    Different,
    Error(String),
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Final verdict for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum Classification {
    Identical,
    Different,
    NewOnLocalOnly,
    MissingLocally,
    /// Staging, transport, or comparison failed; neither identical nor different.
    Failed(String),
}

impl Classification {
    /// Whether this path belongs in the attention set.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            Classification::Different | Classification::NewOnLocalOnly
        )
    }

    /// Operator-facing tag, or `None` for paths that print nothing.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Classification::Identical => None,
            Classification::Different => Some("[diff]"),
            Classification::NewOnLocalOnly => Some("[new]"),
            Classification::MissingLocally => Some("[Not found]"),
            Classification::Failed(_) => Some("[error]"),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Classification::Identical => "identical",
            Classification::Different => "different",
            Classification::NewOnLocalOnly => "new_on_local_only",
            Classification::MissingLocally => "missing_locally",
            Classification::Failed(_) => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// ReconciliationResult
// ---------------------------------------------------------------------------

/// The unit one worker produces for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub path: RelativePath,
    pub local: SideAvailability,
    pub remote: SideAvailability,
    /// Present only when both sides are available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ComparisonOutcome>,
}

impl ReconciliationResult {
    /// A result for a worker that died before producing one.
    pub fn failed(path: RelativePath, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            path,
            local: SideAvailability::Failed(reason.clone()),
            remote: SideAvailability::Failed(reason),
            outcome: None,
        }
    }

    /// Classification precedence:
    /// 1. local missing → `MissingLocally` (whatever the remote side says)
    /// 2. local failed → `Failed`
    /// 3. remote missing → `NewOnLocalOnly`
    /// 4. remote failed → `Failed`
    /// 5. comparator outcome
    pub fn classification(&self) -> Classification {
        match (&self.local, &self.remote) {
            (SideAvailability::Missing(_), _) => Classification::MissingLocally,
            (SideAvailability::Failed(reason), _) => {
                Classification::Failed(format!("local: {reason}"))
            }
            (SideAvailability::Available(_), SideAvailability::Missing(_)) => {
                Classification::NewOnLocalOnly
            }
            (SideAvailability::Available(_), SideAvailability::Failed(reason)) => {
                Classification::Failed(format!("remote: {reason}"))
            }
            (SideAvailability::Available(_), SideAvailability::Available(_)) => {
                match &self.outcome {
                    Some(ComparisonOutcome::Identical) => Classification::Identical,
                    Some(ComparisonOutcome::Different) => Classification::Different,
                    Some(ComparisonOutcome::Error(reason)) => {
                        Classification::Failed(format!("compare: {reason}"))
                    }
                    None => Classification::Failed("compare: no outcome recorded".to_string()),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rel(s: &str) -> RelativePath {
        RelativePath::parse(s).expect("valid path")
    }

    fn available() -> SideAvailability {
        SideAvailability::Available(PathBuf::from("/stage/x"))
    }

    #[rstest]
    #[case("a.css", "a.css")]
    #[case("./html/index.php", "html/index.php")]
    #[case("html//js/./app.js", "html/js/app.js")]
    #[case("data/x.php ", "data/x.php ")]
    #[case(" lead/a.tpl", " lead/a.tpl")]
    fn parse_normalizes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(rel(raw).as_str(), expected);
    }

    #[rstest]
    #[case("", PathError::Empty)]
    #[case("./", PathError::Empty)]
    #[case("/etc/passwd", PathError::Absolute("/etc/passwd".into()))]
    #[case("a/../../b", PathError::ParentSegment("a/../../b".into()))]
    fn parse_rejects(#[case] raw: &str, #[case] expected: PathError) {
        assert_eq!(RelativePath::parse(raw).unwrap_err(), expected);
    }

    #[test]
    fn host_path_is_built_per_segment() {
        let path = rel("html/js/app.js").to_path_under(Path::new("/work"));
        assert_eq!(path, Path::new("/work").join("html").join("js").join("app.js"));
    }

    #[test]
    fn remote_path_uses_slashes() {
        let p = rel("html/js/app.js");
        assert_eq!(p.to_remote_under("/var/www/html"), "/var/www/html/html/js/app.js");
        assert_eq!(p.to_remote_under("/var/www/html/"), "/var/www/html/html/js/app.js");
        assert_eq!(p.to_remote_under("/"), "/html/js/app.js");
        assert_eq!(p.to_remote_under("site"), "site/html/js/app.js");
        assert_eq!(p.to_remote_under(""), "html/js/app.js");
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let ok: RelativePath = serde_yaml::from_str("a//b.php").expect("valid");
        assert_eq!(ok.as_str(), "a/b.php");
        let bad: Result<RelativePath, _> = serde_yaml::from_str("../x");
        assert!(bad.is_err());
    }

    #[test]
    fn local_missing_wins_over_everything() {
        for remote in [
            available(),
            SideAvailability::Missing(MissingCause::NotFoundRemotely),
            SideAvailability::Failed("boom".into()),
        ] {
            let result = ReconciliationResult {
                path: rel("d.html"),
                local: SideAvailability::Missing(MissingCause::NotFoundLocally),
                remote,
                outcome: None,
            };
            assert_eq!(result.classification(), Classification::MissingLocally);
        }
    }

    #[test]
    fn remote_missing_is_new_on_local_only() {
        let result = ReconciliationResult {
            path: rel("c.js"),
            local: available(),
            remote: SideAvailability::Missing(MissingCause::NotFoundRemotely),
            outcome: None,
        };
        assert_eq!(result.classification(), Classification::NewOnLocalOnly);
        assert!(result.classification().needs_attention());
    }

    #[test]
    fn transport_failure_is_not_attention() {
        let result = ReconciliationResult {
            path: rel("c.js"),
            local: available(),
            remote: SideAvailability::Failed("connection reset".into()),
            outcome: None,
        };
        let class = result.classification();
        assert!(matches!(class, Classification::Failed(ref r) if r.contains("connection reset")));
        assert!(!class.needs_attention());
    }

    #[test]
    fn comparator_outcomes_map_one_to_one() {
        let mut result = ReconciliationResult {
            path: rel("b.php"),
            local: available(),
            remote: available(),
            outcome: Some(ComparisonOutcome::Different),
        };
        assert_eq!(result.classification(), Classification::Different);

        result.outcome = Some(ComparisonOutcome::Identical);
        assert_eq!(result.classification(), Classification::Identical);

        result.outcome = Some(ComparisonOutcome::Error("vanished".into()));
        assert!(!result.classification().needs_attention());
    }

    #[test]
    fn tags_match_operator_output() {
        assert_eq!(Classification::Different.tag(), Some("[diff]"));
        assert_eq!(Classification::NewOnLocalOnly.tag(), Some("[new]"));
        assert_eq!(Classification::MissingLocally.tag(), Some("[Not found]"));
        assert_eq!(Classification::Identical.tag(), None);
    }
}
