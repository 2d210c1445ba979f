//! drift core library — domain types, configuration, path selection, errors.
//!
//! Public API surface:
//! - [`types`] — relative paths and per-path reconciliation outcomes
//! - [`error`] — [`ConfigError`], [`PathError`]
//! - [`config`] — YAML settings load / save / init
//! - [`filter`] — walk a local workspace into an ordered path list
//! - [`input`] — read and write plain-text path lists

pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod types;

pub use config::{Settings, Target};
pub use error::{ConfigError, PathError};
pub use filter::PathFilter;
pub use types::{
    Classification, ComparisonOutcome, MissingCause, ReconciliationResult, RelativePath,
    SideAvailability,
};
