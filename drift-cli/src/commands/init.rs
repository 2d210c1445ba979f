//! `drift init [-t <host>]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use drift_core::{config, Settings};

/// Write a default config file.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Default target stored in the config.
    #[arg(short = 't', long, value_name = "HOST")]
    pub target: Option<String>,
}

impl InitArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let (path, created) = match config_file {
            Some(path) if path.exists() => (path.to_path_buf(), false),
            Some(path) => {
                let settings = Settings {
                    target: self.target,
                    ..Settings::default()
                };
                config::save_file(path, &settings)
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                (path.to_path_buf(), true)
            }
            None => {
                let home = config::home()?;
                let (_, created) =
                    config::init_at(&home, self.target).context("failed to write default config")?;
                (config::config_path_at(&home), created)
            }
        };

        if created {
            println!("✓ Wrote default config to {}", path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        Ok(())
    }
}
