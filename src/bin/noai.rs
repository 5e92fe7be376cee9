//! NoAI - minimal chat in the terminal

use std::path::PathBuf;

use clap::Parser;
use noai::runner::{run_tui, AppConfig};

/// NoAI - Minimalistic Chat Interface
#[derive(Parser, Debug)]
#[command(name = "noai")]
#[command(version, about, long_about = None)]
struct Args {
    /// Settings file to use instead of $XDG_CONFIG_HOME/noai/config.json
    #[arg(short = 'c', long, env = "NOAI_CONFIG")]
    config: Option<PathBuf>,

    /// Milliseconds the demo assistant waits before answering
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            debug: args.debug,
            verbose: args.verbose,
            config_path: args.config,
            delay_ms: args.delay_ms,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    run_tui(args.into())
}
