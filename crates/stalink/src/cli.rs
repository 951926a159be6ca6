use std::path::PathBuf;

use clap::Parser;

/// Station-interface control daemon over a simulated engine.
#[derive(Debug, Parser)]
#[command(name = "stalink", version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Run a scripted command sequence against every interface after start
    #[arg(long)]
    pub demo: bool,

    /// Write the resolved configuration to the config path and exit
    #[arg(long)]
    pub write_config: bool,
}
