//! # SHR CLI
//!
//! Expands SHR models from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

use commands::{ConfigCommand, ExpandCommand};

#[derive(Parser)]
#[command(name = "shr")]
#[command(about = "Expand SHR data element models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand the data elements and mappings of a model
    Expand(ExpandCommand),
    /// Print the default expander configuration as YAML
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Expand(cmd) => cmd.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
