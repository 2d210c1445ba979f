//! `drift check` — the reconciliation run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use drift_reconcile::ReportSink;

use crate::output;
use crate::settings::{self, WorkspaceArgs};

/// Arguments for `drift check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Maximum number of paths reconciled at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Reconcile the paths listed in FILE instead of walking the local root.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the paths needing attention to FILE.
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Print the final report as JSON instead of per-path lines.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let mut settings = settings::resolve(config, &self.workspace)?;
        if let Some(n) = self.concurrency {
            settings.concurrency = n;
        }
        if let Some(out) = &self.out {
            settings.output = Some(out.clone());
        }

        // Configuration problems abort before anything is staged.
        settings.target()?;
        let limit = settings.concurrency_limit()?;
        let paths = super::select_paths(&settings, self.input.as_deref())?;
        let json = self.json;

        super::block_on(async move {
            let (reconciler, store) = super::connect(&settings).await?;

            let (mut sink, mut events) = ReportSink::with_channel();
            if let Some(out) = &settings.output {
                sink = sink.with_output(out);
            }
            let printer = tokio::spawn(async move {
                while let Some(result) = events.recv().await {
                    if !json {
                        output::print_result(&result);
                    }
                }
            });

            let outcome = reconciler.reconcile(paths, limit, Arc::new(sink)).await;
            super::disconnect(store.as_ref()).await;
            // Every sender is gone once `reconcile` returns, so this drains and ends.
            let _ = printer.await;

            let report = outcome.context("reconciliation aborted")?;
            if json {
                println!("{}", report.to_json()?);
            } else {
                output::print_report(&report);
            }
            Ok::<_, anyhow::Error>(())
        })?
    }
}
