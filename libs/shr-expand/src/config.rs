//! Expander configuration
//!
//! Configs are plain serde structs that can be loaded from YAML, built in
//! code, and compiled into an [`ExpansionPlan`] once before running.

use crate::error::{Error, Result};
use crate::plan::ExpansionPlan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpanderConfig {
    #[serde(default)]
    pub path_resolution: PathResolution,

    #[serde(default)]
    pub mappings: MappingConfig,

    /// Optional post-expansion filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,
}

/// How constraint paths are resolved to their targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathResolution {
    /// Walk the element graph hop by hop, honouring type constraints along the way
    #[default]
    Deep,
    /// Stand in an untyped value named by the last path segment
    Shallow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Elements without a mapping of their own inherit their base's mapping
    #[serde(default = "default_true")]
    pub inherit_to_unmapped: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            inherit_to_unmapped: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(default)]
    pub strategy: FilterStrategy,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl FilterConfig {
    pub fn new(strategy: FilterStrategy, targets: Vec<String>) -> Self {
        Self { strategy, targets }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    /// Targets are element fully qualified names
    #[default]
    Element,
    /// Targets are namespaces
    Namespace,
    /// Targets may be either
    Hybrid,
}

impl ExpanderConfig {
    pub fn builder() -> ExpanderConfigBuilder {
        ExpanderConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration and compile it into a plan
    pub fn compile(&self) -> Result<ExpansionPlan> {
        if let Some(filter) = &self.filter {
            if filter.targets.is_empty() {
                return Err(Error::InvalidConfig(
                    "filter requires at least one target".into(),
                ));
            }
            if let Some(blank) = filter.targets.iter().find(|t| t.trim().is_empty()) {
                return Err(Error::InvalidConfig(format!(
                    "filter target '{}' is blank",
                    blank
                )));
            }
        }

        tracing::debug!(
            path_resolution = ?self.path_resolution,
            mappings = self.mappings.enabled,
            "compiled expansion plan"
        );

        Ok(ExpansionPlan::from(self))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpanderConfigBuilder {
    config: ExpanderConfig,
}

impl ExpanderConfigBuilder {
    pub fn path_resolution(mut self, path_resolution: PathResolution) -> Self {
        self.config.path_resolution = path_resolution;
        self
    }

    pub fn mappings(mut self, enabled: bool) -> Self {
        self.config.mappings.enabled = enabled;
        self
    }

    pub fn inherit_to_unmapped(mut self, inherit: bool) -> Self {
        self.config.mappings.inherit_to_unmapped = inherit;
        self
    }

    pub fn filter(mut self, strategy: FilterStrategy, targets: Vec<String>) -> Self {
        self.config.filter = Some(FilterConfig::new(strategy, targets));
        self
    }

    pub fn build(self) -> ExpanderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_deep_resolution_with_mappings() {
        let plan = ExpanderConfig::default().compile().unwrap();
        assert_eq!(plan.path_resolution, PathResolution::Deep);
        assert!(plan.mappings.is_some());
        assert!(plan.filter.is_none());
    }

    #[test]
    fn loads_from_yaml() {
        let yaml = r#"
pathResolution: shallow
mappings:
  inheritToUnmapped: false
filter:
  strategy: namespace
  targets: [shr.test]
"#;
        let config = ExpanderConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.path_resolution, PathResolution::Shallow);
        assert!(config.mappings.enabled);
        assert!(!config.mappings.inherit_to_unmapped);

        let filter = config.filter.as_ref().unwrap();
        assert_eq!(filter.strategy, FilterStrategy::Namespace);
        assert_eq!(filter.targets, vec!["shr.test".to_string()]);
    }

    #[test]
    fn yaml_round_trips() {
        let config = ExpanderConfig::builder()
            .path_resolution(PathResolution::Shallow)
            .filter(FilterStrategy::Hybrid, vec!["shr.test.A".into()])
            .build();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ExpanderConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn rejects_filter_without_targets() {
        let config = ExpanderConfig::builder()
            .filter(FilterStrategy::Element, vec![])
            .build();
        assert!(matches!(config.compile(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn disabled_mappings_compile_to_no_mapping_plan() {
        let plan = ExpanderConfig::builder().mappings(false).build().compile().unwrap();
        assert!(plan.mappings.is_none());
    }
}
