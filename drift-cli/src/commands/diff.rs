//! `drift diff <path>` — unified diff of one path, remote → local.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use drift_core::{Classification, RelativePath};
use drift_reconcile::{diff_path, FileDiff, PathDiff};

use crate::settings::{self, WorkspaceArgs};

/// Arguments for `drift diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Path relative to both workspace roots.
    pub path: String,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

impl DiffArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let settings = settings::resolve(config, &self.workspace)?;
        let path = RelativePath::parse(&self.path)
            .with_context(|| format!("invalid path '{}'", self.path))?;
        settings.target()?;

        let outcome = super::block_on(async {
            let (reconciler, store) = super::connect(&settings).await?;
            let outcome = diff_path(&reconciler, &path).await;
            super::disconnect(store.as_ref()).await;
            Ok::<_, anyhow::Error>(outcome?)
        })??;

        println!("{}", describe(&path, &outcome)?);
        Ok(())
    }
}

/// What `drift diff` prints for one path.
fn describe(path: &RelativePath, outcome: &PathDiff) -> Result<String> {
    let text = match outcome.result.classification() {
        Classification::MissingLocally => format!("[Not found] {path}"),
        Classification::NewOnLocalOnly => format!("[new] {path} (not on remote)"),
        Classification::Failed(reason) => bail!("cannot diff '{path}': {reason}"),
        Classification::Identical | Classification::Different => match &outcome.diff {
            Some(FileDiff::Identical) => format!("No differences for '{path}'."),
            Some(FileDiff::Binary) => format!("Binary files remote/{path} and local/{path} differ"),
            Some(FileDiff::Text(text)) => text.trim_end_matches('\n').to_string(),
            None => bail!("cannot diff '{path}': no diff available"),
        },
    };
    Ok(text)
}
