//! Result aggregation.
//!
//! [`ReportSink`] is the one piece of state every worker touches. Its
//! mutable part sits behind a `std::sync::Mutex` that is only ever held for
//! a few field updates, never across an `.await`. Each recorded result is
//! also forwarded, in completion order, over an optional unbounded channel
//! so a front end can print lines while the run is still going.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use drift_core::{Classification, ReconciliationResult, RelativePath};

use crate::error::ReconcileError;

pub type EventSender = mpsc::UnboundedSender<ReconciliationResult>;
pub type EventReceiver = mpsc::UnboundedReceiver<ReconciliationResult>;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-classification counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub identical: usize,
    pub different: usize,
    pub new_on_local_only: usize,
    pub missing_locally: usize,
    pub failed: usize,
}

impl Summary {
    fn count(&mut self, class: &Classification) {
        self.total += 1;
        match class {
            Classification::Identical => self.identical += 1,
            Classification::Different => self.different += 1,
            Classification::NewOnLocalOnly => self.new_on_local_only += 1,
            Classification::MissingLocally => self.missing_locally += 1,
            Classification::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPath {
    pub path: RelativePath,
    pub reason: String,
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Different and local-only paths, in completion order.
    pub attention: Vec<RelativePath>,
    pub all_merged: bool,
    pub summary: Summary,
    pub failures: Vec<FailedPath>,
    /// Where the attention list was written, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Report {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    pub fn attention_set(&self) -> HashSet<&RelativePath> {
        self.attention.iter().collect()
    }

    pub fn to_json(&self) -> Result<String, ReconcileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// ReportSink
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SinkState {
    attention: Vec<RelativePath>,
    seen: HashSet<RelativePath>,
    all_merged: bool,
    summary: Summary,
    failures: Vec<FailedPath>,
}

impl SinkState {
    fn push_attention(&mut self, path: &RelativePath) {
        if self.seen.insert(path.clone()) {
            self.attention.push(path.clone());
        }
    }
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            attention: Vec::new(),
            seen: HashSet::new(),
            all_merged: true,
            summary: Summary::default(),
            failures: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct ReportSink {
    state: Mutex<SinkState>,
    events: Option<EventSender>,
    output: Option<PathBuf>,
    started_at: DateTime<Utc>,
}

impl Default for ReportSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SinkState::default()),
            events: None,
            output: None,
            started_at: Utc::now(),
        }
    }

    /// A sink plus the receiving end of its per-result channel.
    pub fn with_channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new().with_events(tx), rx)
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Persist the attention list to `path` on [`finalize`](Self::finalize).
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `path` to the attention list; a second add is a no-op.
    pub fn record_attention(&self, path: &RelativePath) {
        self.lock().push_attention(path);
    }

    /// Flip `all_merged` to false. There is no way back.
    pub fn clear_merged(&self) {
        self.lock().all_merged = false;
    }

    pub fn all_merged(&self) -> bool {
        self.lock().all_merged
    }

    /// Classify `result`, fold it into the aggregate and forward it.
    pub fn record(&self, result: ReconciliationResult) -> Classification {
        let class = result.classification();
        {
            // Observers never see an attention entry with `all_merged` still set.
            let mut state = self.lock();
            state.summary.count(&class);
            if let Classification::Failed(reason) = &class {
                state.failures.push(FailedPath {
                    path: result.path.clone(),
                    reason: reason.clone(),
                });
            }
            if class.needs_attention() {
                state.push_attention(&result.path);
                state.all_merged = false;
            }
        }

        match &class {
            Classification::Failed(reason) => {
                tracing::warn!(path = %result.path, reason = %reason, "reconciliation failed")
            }
            other => tracing::debug!(path = %result.path, class = other.key(), "reconciled"),
        }

        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = events.send(result);
        }
        class
    }

    /// Snapshot the aggregate and write the attention list if configured.
    pub fn finalize(&self) -> Result<Report, ReconcileError> {
        let (attention, all_merged, summary, failures) = {
            let state = self.lock();
            (
                state.attention.clone(),
                state.all_merged,
                state.summary,
                state.failures.clone(),
            )
        };

        if let Some(path) = &self.output {
            drift_core::input::write_path_list(path, &attention)?;
            tracing::info!(path = %path.display(), count = attention.len(), "attention list written");
        }

        Ok(Report {
            attention,
            all_merged,
            summary,
            failures,
            output: self.output.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        })
    }
}
