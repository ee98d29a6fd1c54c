//! Constraints refining values and fields

use super::cardinality::Cardinality;
use super::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A coded concept (`system#code`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    pub system: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Concept {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.system, self.code)
    }
}

/// Value set binding strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    #[default]
    Required,
    Extensible,
    Preferred,
    Example,
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Required => "required",
            Self::Extensible => "extensible",
            Self::Preferred => "preferred",
            Self::Example => "example",
        };
        write!(f, "{}", s)
    }
}

/// The refinement a constraint applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConstraintKind {
    Card {
        card: Cardinality,
    },
    #[serde(rename_all = "camelCase")]
    Type {
        is_a: Identifier,
    },
    ValueSet {
        uri: String,
        #[serde(default)]
        strength: BindingStrength,
    },
    Code {
        code: Concept,
    },
    IncludesCode {
        code: Concept,
    },
    #[serde(rename_all = "camelCase")]
    IncludesType {
        is_a: Identifier,
        card: Cardinality,
    },
    Boolean {
        value: bool,
    },
}

/// Discriminant of [`ConstraintKind`], used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintTag {
    Card,
    Type,
    ValueSet,
    Code,
    IncludesCode,
    IncludesType,
    Boolean,
}

impl fmt::Display for ConstraintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Card => "cardinality",
            Self::Type => "type",
            Self::ValueSet => "value set",
            Self::Code => "code",
            Self::IncludesCode => "includes code",
            Self::IncludesType => "includes type",
            Self::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

impl ConstraintKind {
    pub fn tag(&self) -> ConstraintTag {
        match self {
            Self::Card { .. } => ConstraintTag::Card,
            Self::Type { .. } => ConstraintTag::Type,
            Self::ValueSet { .. } => ConstraintTag::ValueSet,
            Self::Code { .. } => ConstraintTag::Code,
            Self::IncludesCode { .. } => ConstraintTag::IncludesCode,
            Self::IncludesType { .. } => ConstraintTag::IncludesType,
            Self::Boolean { .. } => ConstraintTag::Boolean,
        }
    }
}

/// A constraint attached to a value, optionally scoped to a nested path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Path (relative to the owning value) of the constrained sub-value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Identifier>,

    /// Constraint targets the value of the thing at `path`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub on_value: bool,

    #[serde(flatten)]
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            path: Vec::new(),
            on_value: false,
            kind,
        }
    }

    pub fn card(card: Cardinality) -> Self {
        Self::new(ConstraintKind::Card { card })
    }

    pub fn type_(is_a: Identifier) -> Self {
        Self::new(ConstraintKind::Type { is_a })
    }

    pub fn value_set(uri: impl Into<String>, strength: BindingStrength) -> Self {
        Self::new(ConstraintKind::ValueSet {
            uri: uri.into(),
            strength,
        })
    }

    pub fn code(code: Concept) -> Self {
        Self::new(ConstraintKind::Code { code })
    }

    pub fn includes_code(code: Concept) -> Self {
        Self::new(ConstraintKind::IncludesCode { code })
    }

    pub fn includes_type(is_a: Identifier, card: Cardinality) -> Self {
        Self::new(ConstraintKind::IncludesType { is_a, card })
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ConstraintKind::Boolean { value })
    }

    pub fn with_path(mut self, path: Vec<Identifier>) -> Self {
        self.path = path;
        self
    }

    pub fn with_on_value(mut self, on_value: bool) -> Self {
        self.on_value = on_value;
        self
    }

    pub fn tag(&self) -> ConstraintTag {
        self.kind.tag()
    }

    /// Check if this constraint addresses the same target as `other`
    pub fn same_target(&self, other: &Constraint) -> bool {
        self.path == other.path && self.on_value == other.on_value
    }

    /// Dotted rendering of the path (empty for own constraints)
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}", self.path_string())?;
            if self.on_value {
                write!(f, "[value]")?;
            }
            write!(f, " ")?;
        } else if self.on_value {
            write!(f, "[value] ")?;
        }

        match &self.kind {
            ConstraintKind::Card { card } => write!(f, "{}", card),
            ConstraintKind::Type { is_a } => write!(f, "substitute {}", is_a),
            ConstraintKind::ValueSet { uri, strength } => {
                write!(f, "from {} ({})", uri, strength)
            }
            ConstraintKind::Code { code } => write!(f, "= {}", code),
            ConstraintKind::IncludesCode { code } => write!(f, "includes {}", code),
            ConstraintKind::IncludesType { is_a, card } => {
                write!(f, "includes {} {}", card, is_a)
            }
            ConstraintKind::Boolean { value } => write!(f, "= {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged_constraints() {
        let c: Constraint = serde_json::from_value(json!({
            "type": "type",
            "path": [{ "namespace": "shr.test", "name": "B" }],
            "onValue": true,
            "isA": { "namespace": "shr.test", "name": "SubB" }
        }))
        .unwrap();

        assert!(c.on_value);
        assert_eq!(c.path, vec![Identifier::new("shr.test", "B")]);
        assert_eq!(
            c.kind,
            ConstraintKind::Type {
                is_a: Identifier::new("shr.test", "SubB")
            }
        );
    }

    #[test]
    fn serializes_without_defaults() {
        let c = Constraint::card(Cardinality::bounded(1, 1));
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value, json!({ "type": "card", "card": { "min": 1, "max": 1 } }));
    }

    #[test]
    fn displays_paths() {
        let c = Constraint::boolean(true)
            .with_path(vec![Identifier::new("shr.test", "Flag")])
            .with_on_value(true);
        assert_eq!(c.to_string(), "shr.test.Flag[value] = true");
    }
}
