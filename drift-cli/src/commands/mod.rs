//! Subcommand implementations.

pub mod check;
pub mod diff;
pub mod init;
pub mod list;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};

use drift_core::{PathFilter, RelativePath, Settings};
use drift_reconcile::{Comparator, Reconciler, StagingArea};
use drift_remote::{RemoteFileStore, SshOptions};

/// Run `fut` to completion on a fresh multi-thread runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(fut))
}

/// The path list from `--input`, or the filtered walk of the local root.
pub(crate) fn select_paths(
    settings: &Settings,
    input: Option<&std::path::Path>,
) -> Result<Vec<RelativePath>> {
    match input {
        Some(list) => drift_core::input::read_path_list(list)
            .with_context(|| format!("cannot read input list '{}'", list.display())),
        None => PathFilter::from_settings(settings)
            .collect(&settings.local_root)
            .with_context(|| {
                format!(
                    "cannot walk local workspace '{}'",
                    settings.local_root.display()
                )
            }),
    }
}

/// Open the remote store and wire up a reconciler for `settings`.
pub(crate) async fn connect(settings: &Settings) -> Result<(Reconciler, Arc<dyn RemoteFileStore>)> {
    let target = settings.target()?;
    let store = drift_remote::connect(&target, &SshOptions::from_settings(settings))
        .await
        .with_context(|| format!("cannot connect to {target}"))?;
    let reconciler = Reconciler::new(
        settings.local_root.clone(),
        settings.remote_root.clone(),
        Arc::clone(&store),
        StagingArea::new(settings.stage_dir.clone()),
        Comparator::from_flag(settings.ignore_line_endings),
    );
    Ok((reconciler, store))
}

pub(crate) async fn disconnect(store: &dyn RemoteFileStore) {
    if let Err(err) = store.close().await {
        tracing::warn!(error = %err, "closing remote session failed");
    }
}
