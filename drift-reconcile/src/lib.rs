//! # drift-reconcile
//!
//! Stages each path from the local and remote workspaces, compares the
//! copies and aggregates the verdicts.
//!
//! Build a [`Reconciler`] and call [`Reconciler::reconcile`] with the path
//! list, a concurrency limit and a [`ReportSink`].

pub mod compare;
pub mod diff;
pub mod engine;
pub mod error;
pub mod report;
pub mod staging;

pub use compare::Comparator;
pub use diff::{diff_for, diff_path, FileDiff, PathDiff};
pub use engine::Reconciler;
pub use error::{CompareError, ReconcileError, StageError};
pub use report::{EventReceiver, FailedPath, Report, ReportSink, Summary};
pub use staging::StagingArea;
