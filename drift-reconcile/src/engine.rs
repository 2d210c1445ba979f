//! The bounded-concurrency reconciliation engine.
//!
//! [`Reconciler::reconcile`] spawns one task per distinct path into a
//! `JoinSet`. Each task first takes a permit from a `Semaphore` sized to the
//! concurrency limit, then stages both sides, compares and hands the result
//! to the [`ReportSink`]. The caller gets the [`Report`] once every task has
//! finished.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use drift_core::{MissingCause, ReconciliationResult, RelativePath, SideAvailability};
use drift_remote::RemoteFileStore;

use crate::compare::Comparator;
use crate::error::ReconcileError;
use crate::report::{Report, ReportSink};
use crate::staging::StagingArea;

struct Inner {
    local_root: PathBuf,
    remote_root: String,
    store: Arc<dyn RemoteFileStore>,
    staging: StagingArea,
    comparator: Comparator,
}

/// Cheap to clone; every clone shares the same store and staging area.
#[derive(Clone)]
pub struct Reconciler {
    inner: Arc<Inner>,
}

impl Reconciler {
    pub fn new(
        local_root: impl Into<PathBuf>,
        remote_root: impl Into<String>,
        store: Arc<dyn RemoteFileStore>,
        staging: StagingArea,
        comparator: Comparator,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                local_root: local_root.into(),
                remote_root: remote_root.into(),
                store,
                staging,
                comparator,
            }),
        }
    }

    pub fn local_root(&self) -> &Path {
        &self.inner.local_root
    }

    pub fn remote_root(&self) -> &str {
        &self.inner.remote_root
    }

    pub fn staging(&self) -> &StagingArea {
        &self.inner.staging
    }

    pub fn comparator(&self) -> Comparator {
        self.inner.comparator
    }

    pub fn store(&self) -> &Arc<dyn RemoteFileStore> {
        &self.inner.store
    }

    /// Reconcile every path with at most `limit` in flight at once.
    ///
    /// Resets the staging area first; that is the only fatal step besides
    /// writing the attention list in [`ReportSink::finalize`]. Duplicate
    /// paths are reconciled once.
    pub async fn reconcile(
        &self,
        paths: Vec<RelativePath>,
        limit: NonZeroUsize,
        sink: Arc<ReportSink>,
    ) -> Result<Report, ReconcileError> {
        self.inner.staging.reset().await?;

        let mut seen = HashSet::with_capacity(paths.len());
        let paths: Vec<RelativePath> = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        tracing::info!(
            paths = paths.len(),
            limit = limit.get(),
            remote = %self.inner.store.describe(),
            "reconciliation started"
        );

        let gate = Arc::new(Semaphore::new(limit.get()));
        let mut workers = JoinSet::new();
        for path in paths.iter().cloned() {
            let this = self.clone();
            let gate = Arc::clone(&gate);
            workers.spawn(async move {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return ReconciliationResult::failed(path, "admission gate closed"),
                };
                this.reconcile_guarded(path).await
            });
        }

        let mut recorded = HashSet::with_capacity(paths.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(result) => {
                    recorded.insert(result.path.clone());
                    sink.record(result);
                }
                Err(err) => tracing::error!(error = %err, "reconciliation task lost"),
            }
        }
        for path in paths {
            if !recorded.contains(&path) {
                sink.record(ReconciliationResult::failed(path, "worker task lost"));
            }
        }

        let report = sink.finalize()?;
        tracing::info!(
            attention = report.attention.len(),
            all_merged = report.all_merged,
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Run the unit of work on its own task so a panic becomes a `Failed`
    /// result for this path instead of tearing down the caller.
    async fn reconcile_guarded(&self, path: RelativePath) -> ReconciliationResult {
        let this = self.clone();
        let task_path = path.clone();
        match tokio::spawn(async move { this.reconcile_one(&task_path).await }).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => {
                ReconciliationResult::failed(path, "worker panicked during reconciliation")
            }
            Err(err) => ReconciliationResult::failed(path, format!("worker aborted: {err}")),
        }
    }

    /// Stage, compare and classify one path. Never fails; every problem is
    /// recorded in the returned result.
    ///
    /// The staging area is not reset here.
    pub async fn reconcile_one(&self, path: &RelativePath) -> ReconciliationResult {
        let inner = &self.inner;

        let local = match inner
            .staging
            .materialize_local(&inner.local_root, path)
            .await
        {
            Ok(staged) => SideAvailability::Available(staged),
            Err(err) if err.is_not_found() => SideAvailability::Missing(MissingCause::NotFoundLocally),
            Err(err) => SideAvailability::Failed(err.to_string()),
        };

        let remote = match inner
            .staging
            .materialize_remote(inner.store.as_ref(), &inner.remote_root, path)
            .await
        {
            Ok(staged) => SideAvailability::Available(staged),
            Err(err) if err.is_not_found() => {
                SideAvailability::Missing(MissingCause::NotFoundRemotely)
            }
            Err(err) => SideAvailability::Failed(err.to_string()),
        };

        let outcome = match (&local, &remote) {
            (SideAvailability::Available(a), SideAvailability::Available(b)) => {
                Some(inner.comparator.compare(a, b).await)
            }
            _ => None,
        };

        tracing::debug!(path = %path, local = ?local, remote = ?remote, outcome = ?outcome, "path staged");
        ReconciliationResult {
            path: path.clone(),
            local,
            remote,
            outcome,
        }
    }
}
