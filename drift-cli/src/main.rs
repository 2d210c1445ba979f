//! drift — report drift between a local checkout and a deployed copy.
//!
//! # Usage
//!
//! ```text
//! drift check -t <host> [-l <dir>] [-r <dir>] [--input <list>] [-o <file>] [--ignore-eol]
//! drift list [-l <dir>] [-o <file>]
//! drift diff <path> -t <host>
//! drift init [-t <host>]
//! ```

mod commands;
mod output;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{check::CheckArgs, diff::DiffArgs, init::InitArgs, list::ListArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "drift",
    version,
    about = "Compare a local workspace against a remote deployment",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ~/.drift/config.yaml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile every selected path and report the ones needing attention.
    Check(CheckArgs),

    /// Print the paths a check would reconcile.
    List(ListArgs),

    /// Show a unified diff of one path between remote and local.
    Diff(DiffArgs),

    /// Write a default config file.
    Init(InitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check(args) => args.run(config),
        Commands::List(args) => args.run(config),
        Commands::Diff(args) => args.run(config),
        Commands::Init(args) => args.run(config),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
