//! Config command implementation.

use anyhow::Context;
use clap::Args;
use shr_expand::ExpanderConfig;
use std::fs;
use std::path::PathBuf;

/// Print (or write) the default expander configuration
#[derive(Args)]
pub struct ConfigCommand {
    /// Write the configuration to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let yaml = ExpanderConfig::default()
            .to_yaml()
            .context("Failed to serialize default configuration")?;

        match &self.output {
            Some(path) => fs::write(path, yaml)
                .with_context(|| format!("Failed to write {}", path.display())),
            None => {
                print!("{}", yaml);
                Ok(())
            }
        }
    }
}
