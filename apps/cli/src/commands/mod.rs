//! CLI commands

pub mod config;
pub mod expand;

pub use config::ConfigCommand;
pub use expand::ExpandCommand;
