//! Unified diff of one path's staged pair, for `drift diff`.

use std::path::Path;

use similar::TextDiff;

use drift_core::{ComparisonOutcome, ReconciliationResult, RelativePath, SideAvailability};

use crate::compare::{strip_trailing_cr, Comparator};
use crate::engine::Reconciler;
use crate::error::{compare_io_err, CompareError, ReconcileError};

/// Rendered difference between the remote and local copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDiff {
    Identical,
    /// At least one side is not UTF-8 text.
    Binary,
    /// `--- remote/<path>` / `+++ local/<path>` unified diff.
    Text(String),
}

/// One path's result plus its diff when both sides were staged.
#[derive(Debug, Clone)]
pub struct PathDiff {
    pub result: ReconciliationResult,
    pub diff: Option<FileDiff>,
}

/// Stage `path` from both sides and diff the copies.
pub async fn diff_path(
    reconciler: &Reconciler,
    path: &RelativePath,
) -> Result<PathDiff, ReconcileError> {
    reconciler.staging().reset().await?;
    let result = reconciler.reconcile_one(path).await;
    let diff = diff_for(&result, reconciler.comparator()).await?;
    Ok(PathDiff { result, diff })
}

/// Diff an already compared result. `None` unless both sides were staged
/// and the comparison reached a verdict.
pub async fn diff_for(
    result: &ReconciliationResult,
    comparator: Comparator,
) -> Result<Option<FileDiff>, ReconcileError> {
    let (SideAvailability::Available(local), SideAvailability::Available(remote)) =
        (&result.local, &result.remote)
    else {
        return Ok(None);
    };
    match result.outcome {
        Some(ComparisonOutcome::Identical) => Ok(Some(FileDiff::Identical)),
        Some(ComparisonOutcome::Different) => render(&result.path, local, remote, comparator)
            .await
            .map(Some)
            .map_err(|source| ReconcileError::Diff {
                path: result.path.clone(),
                source,
            }),
        Some(ComparisonOutcome::Error(_)) | None => Ok(None),
    }
}

/// Diff two staged files already known to differ. Remote is the old side,
/// local the new one.
pub async fn render(
    path: &RelativePath,
    local: &Path,
    remote: &Path,
    comparator: Comparator,
) -> Result<FileDiff, CompareError> {
    let mut local_bytes = tokio::fs::read(local)
        .await
        .map_err(|e| compare_io_err(local, e))?;
    let mut remote_bytes = tokio::fs::read(remote)
        .await
        .map_err(|e| compare_io_err(remote, e))?;
    if comparator == Comparator::IgnoreLineEndings {
        local_bytes = strip_trailing_cr(&local_bytes);
        remote_bytes = strip_trailing_cr(&remote_bytes);
    }

    let (Ok(local_text), Ok(remote_text)) =
        (String::from_utf8(local_bytes), String::from_utf8(remote_bytes))
    else {
        return Ok(FileDiff::Binary);
    };

    let old_header = format!("remote/{path}");
    let new_header = format!("local/{path}");
    let unified = TextDiff::from_lines(&remote_text, &local_text)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    Ok(FileDiff::Text(unified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use drift_core::Classification;
    use drift_remote::DirStore;
    use tempfile::TempDir;

    use crate::staging::StagingArea;

    fn setup(local: &str, remote: &str, comparator: Comparator) -> (TempDir, Reconciler) {
        let tmp = TempDir::new().unwrap();
        let l = tmp.path().join("local");
        let r = tmp.path().join("remote");
        std::fs::create_dir_all(&l).unwrap();
        std::fs::create_dir_all(&r).unwrap();
        std::fs::write(l.join("index.php"), local).unwrap();
        std::fs::write(r.join("index.php"), remote).unwrap();
        let reconciler = Reconciler::new(
            &l,
            r.to_string_lossy().to_string(),
            Arc::new(DirStore::new()),
            StagingArea::new(tmp.path().join("stage")),
            comparator,
        );
        (tmp, reconciler)
    }

    fn rel(s: &str) -> RelativePath {
        RelativePath::parse(s).unwrap()
    }

    #[tokio::test]
    async fn changed_line_renders_unified_diff() {
        let (_tmp, reconciler) = setup("a\nnew\nc\n", "a\nold\nc\n", Comparator::Strict);
        let out = diff_path(&reconciler, &rel("index.php")).await.unwrap();
        assert_eq!(out.result.classification(), Classification::Different);
        let Some(FileDiff::Text(text)) = out.diff else {
            panic!("expected text diff, got {:?}", out.diff);
        };
        assert!(text.contains("--- remote/index.php"));
        assert!(text.contains("+++ local/index.php"));
        assert!(text.contains("-old"));
        assert!(text.contains("+new"));
    }

    #[tokio::test]
    async fn crlf_only_change_is_identical_when_ignored() {
        let (_tmp, reconciler) = setup("a\r\nb\r\n", "a\nb\n", Comparator::IgnoreLineEndings);
        let out = diff_path(&reconciler, &rel("index.php")).await.unwrap();
        assert_eq!(out.diff, Some(FileDiff::Identical));
    }

    #[tokio::test]
    async fn non_utf8_is_binary() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        std::fs::write(&a, [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(&b, [0xff, 0x00]).unwrap();
        let diff = render(&rel("logo.png"), &a, &b, Comparator::Strict)
            .await
            .unwrap();
        assert_eq!(diff, FileDiff::Binary);
    }

    #[tokio::test]
    async fn unreadable_staged_copy_is_an_error() {
        let (tmp, reconciler) = setup("a\nnew\n", "a\nold\n", Comparator::Strict);
        let mut result = reconciler.reconcile_one(&rel("index.php")).await;
        assert_eq!(result.classification(), Classification::Different);
        std::fs::remove_dir_all(tmp.path().join("stage")).unwrap();

        let err = diff_for(&result, Comparator::Strict).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Diff { .. }), "got: {err}");
        assert!(err.to_string().contains("index.php"));

        // A compared-equal pair is not read again.
        result.outcome = Some(ComparisonOutcome::Identical);
        let diff = diff_for(&result, Comparator::Strict).await.unwrap();
        assert_eq!(diff, Some(FileDiff::Identical));
    }

    #[tokio::test]
    async fn missing_side_has_no_diff() {
        let (tmp, reconciler) = setup("x", "x", Comparator::Strict);
        std::fs::remove_file(tmp.path().join("remote/index.php")).unwrap();
        let out = diff_path(&reconciler, &rel("index.php")).await.unwrap();
        assert_eq!(out.result.classification(), Classification::NewOnLocalOnly);
        assert!(out.diff.is_none());
    }
}
