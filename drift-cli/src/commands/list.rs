//! `drift list` — the selected path list, reusable as `check --input`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::settings::{self, WorkspaceArgs};

/// Arguments for `drift list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Write the list to FILE instead of stdout.
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl ListArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let settings = settings::resolve(config, &self.workspace)?;
        let paths = super::select_paths(&settings, None)?;

        match &self.out {
            Some(out) => {
                drift_core::input::write_path_list(out, &paths)
                    .with_context(|| format!("cannot write '{}'", out.display()))?;
                println!("Wrote {} path(s) to {}", paths.len(), out.display());
            }
            None => {
                for path in &paths {
                    println!("{path}");
                }
            }
        }
        Ok(())
    }
}
