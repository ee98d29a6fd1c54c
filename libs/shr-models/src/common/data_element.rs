//! Data element definitions

use super::constraint::Concept;
use super::identifier::Identifier;
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An entry of a data element's `basedOn` list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BasedOn {
    Element { identifier: Identifier },
    Tbd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl BasedOn {
    pub fn element(identifier: Identifier) -> Self {
        Self::Element { identifier }
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Element { identifier } => Some(identifier),
            Self::Tbd { .. } => None,
        }
    }

    pub fn is_tbd(&self) -> bool {
        matches!(self, Self::Tbd { .. })
    }
}

impl fmt::Display for BasedOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { identifier } => write!(f, "{}", identifier),
            Self::Tbd { .. } => write!(f, "TBD"),
        }
    }
}

/// A named, typed definition: roughly a class or record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataElement {
    pub identifier: Identifier,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub based_on: Vec<BasedOn>,

    /// The element's own (unnamed) value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Named properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Value>,

    #[serde(default)]
    pub is_entry: bool,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default)]
    pub is_group: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,

    /// Resolved ancestors, root first (set by expansion)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hierarchy: Vec<Identifier>,
}

impl DataElement {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            based_on: Vec::new(),
            value: None,
            fields: Vec::new(),
            is_entry: false,
            is_abstract: false,
            is_group: false,
            description: None,
            concepts: Vec::new(),
            hierarchy: Vec::new(),
        }
    }

    pub fn with_based_on(mut self, base: Identifier) -> Self {
        self.based_on.push(BasedOn::element(base));
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_field(mut self, field: Value) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn as_entry(mut self) -> Self {
        self.is_entry = true;
        self
    }

    /// Non-TBD base identifiers, in declaration order
    pub fn bases(&self) -> impl Iterator<Item = &Identifier> {
        self.based_on.iter().filter_map(BasedOn::identifier)
    }

    /// Direct parent in the resolved hierarchy
    pub fn parent(&self) -> Option<&Identifier> {
        self.hierarchy.last()
    }

    /// Find a field by identifier or effective identifier
    pub fn find_field(&self, id: &Identifier) -> Option<&Value> {
        self.fields.iter().find(|f| f.is_identified_by(id))
    }

    /// The value followed by the fields
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.value.iter().chain(self.fields.iter())
    }
}
