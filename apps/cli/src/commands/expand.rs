//! Expand command implementation.

use anyhow::{bail, Context};
use clap::Args;
use shr_expand::{
    read_specifications, Expander, ExpanderConfig, ExpansionOutcome, FilterConfig, FilterStrategy,
    IssueSeverity,
};
use std::fs;
use std::path::PathBuf;

/// Expand the data elements and mappings of a model
#[derive(Args)]
pub struct ExpandCommand {
    /// Model file (JSON specifications document)
    pub input: PathBuf,

    /// Expander configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the expanded model here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the issues as JSON to this file
    #[arg(long)]
    pub issues: Option<PathBuf>,

    /// Keep only these elements (or namespaces) and their dependencies
    #[arg(long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// How `--target` values are matched
    #[arg(long, value_enum, default_value_t = Strategy::Element)]
    pub strategy: Strategy,

    /// Exit with an error when any error-severity issue was found
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Strategy {
    Element,
    Namespace,
    Hybrid,
}

impl From<Strategy> for FilterStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Element => FilterStrategy::Element,
            Strategy::Namespace => FilterStrategy::Namespace,
            Strategy::Hybrid => FilterStrategy::Hybrid,
        }
    }
}

impl ExpandCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        let specs = read_specifications(&self.input)
            .with_context(|| format!("Failed to load {}", self.input.display()))?;
        tracing::info!(
            input = %self.input.display(),
            elements = specs.data_elements.len(),
            maps = specs.maps.len(),
            "loaded model"
        );

        let expander = Expander::from_config(&config).context("Invalid expander configuration")?;
        let outcome = expander.expand(&specs);

        report_issues(&outcome);
        if let Some(path) = &self.issues {
            let json = serde_json::to_string_pretty(&outcome.issues)?;
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        }

        let json = serde_json::to_string_pretty(&outcome.specifications)
            .context("Failed to serialize expanded model")?;
        match &self.output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(output = %path.display(), "wrote expanded model");
            }
            None => println!("{}", json),
        }

        if self.strict && outcome.has_errors() {
            bail!("expansion finished with {} error(s)", outcome.error_count());
        }
        Ok(())
    }

    /// Config file (or defaults), with `--target` replacing any configured filter
    fn load_config(&self) -> anyhow::Result<ExpanderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let yaml = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                ExpanderConfig::from_yaml(&yaml)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => ExpanderConfig::default(),
        };

        if !self.targets.is_empty() {
            config.filter = Some(FilterConfig::new(
                self.strategy.into(),
                self.targets.clone(),
            ));
        }
        Ok(config)
    }
}

fn report_issues(outcome: &ExpansionOutcome) {
    for issue in &outcome.issues {
        let element = issue.element.as_ref().map(|id| id.to_string()).unwrap_or_default();
        match issue.severity {
            IssueSeverity::Error => {
                tracing::error!(kind = %issue.kind, element = %element, "{}", issue.message)
            }
            IssueSeverity::Warning => {
                tracing::warn!(kind = %issue.kind, element = %element, "{}", issue.message)
            }
        }
    }

    tracing::info!(
        errors = outcome.error_count(),
        warnings = outcome.warning_count(),
        "expansion finished"
    );
}
