//! Target-system mappings

use super::cardinality::Cardinality;
use super::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single mapping rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MappingRule {
    /// Maps the value at `source_path` to the target field
    #[serde(rename_all = "camelCase")]
    Field {
        source_path: Vec<Identifier>,
        target: String,
    },
    /// Overrides the cardinality of a target field
    Cardinality { target: String, card: Cardinality },
    /// Assigns a fixed value to a target field
    FixedValue { target: String, value: String },
}

impl MappingRule {
    pub fn field(source_path: Vec<Identifier>, target: impl Into<String>) -> Self {
        Self::Field {
            source_path,
            target: target.into(),
        }
    }

    pub fn cardinality(target: impl Into<String>, card: Cardinality) -> Self {
        Self::Cardinality {
            target: target.into(),
            card,
        }
    }

    pub fn fixed_value(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::FixedValue {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Field { target, .. }
            | Self::Cardinality { target, .. }
            | Self::FixedValue { target, .. } => target,
        }
    }

    /// Check if `other` re-declares the same slot, so one replaces the other
    pub fn same_slot(&self, other: &MappingRule) -> bool {
        match (self, other) {
            (
                Self::Field { source_path: a, .. },
                Self::Field { source_path: b, .. },
            ) => a == b,
            (Self::Cardinality { target: a, .. }, Self::Cardinality { target: b, .. }) => a == b,
            (Self::FixedValue { target: a, .. }, Self::FixedValue { target: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field {
                source_path,
                target,
            } => {
                let path = source_path
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                write!(f, "{} maps to {}", path, target)
            }
            Self::Cardinality { target, card } => write!(f, "{} is {}", target, card),
            Self::FixedValue { target, value } => write!(f, "{} fixed to {}", target, value),
        }
    }
}

/// How one source element maps onto a target system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMapping {
    /// Source element
    pub identifier: Identifier,

    /// Target system name (e.g. `FHIR_STU_3`)
    pub target_spec: String,

    /// Destination class/resource in the target system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_item: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<MappingRule>,
}

impl ElementMapping {
    pub fn new(identifier: Identifier, target_spec: impl Into<String>) -> Self {
        Self {
            identifier,
            target_spec: target_spec.into(),
            target_item: None,
            rules: Vec::new(),
        }
    }

    pub fn with_target_item(mut self, target_item: impl Into<String>) -> Self {
        self.target_item = Some(target_item.into());
        self
    }

    pub fn with_rule(mut self, rule: MappingRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field_rules(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules
            .iter()
            .filter(|r| matches!(r, MappingRule::Field { .. }))
    }
}
