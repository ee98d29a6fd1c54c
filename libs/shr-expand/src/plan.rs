use crate::{FilterConfig, MappingConfig, PathResolution};

/// Compiled expansion plan
#[derive(Debug, Clone)]
pub struct ExpansionPlan {
    pub path_resolution: PathResolution,
    /// `None` when mapping expansion is disabled
    pub mappings: Option<MappingPlan>,
    pub filter: Option<FilterConfig>,
}

impl Default for ExpansionPlan {
    fn default() -> Self {
        Self::from(&crate::ExpanderConfig::default())
    }
}

impl From<&crate::ExpanderConfig> for ExpansionPlan {
    fn from(cfg: &crate::ExpanderConfig) -> Self {
        Self {
            path_resolution: cfg.path_resolution,
            mappings: cfg
                .mappings
                .enabled
                .then(|| MappingPlan::from(&cfg.mappings)),
            filter: cfg.filter.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MappingPlan {
    pub inherit_to_unmapped: bool,
}

impl From<&MappingConfig> for MappingPlan {
    fn from(cfg: &MappingConfig) -> Self {
        Self {
            inherit_to_unmapped: cfg.inherit_to_unmapped,
        }
    }
}
