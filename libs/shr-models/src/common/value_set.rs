//! Namespaces, value sets and code systems
//!
//! These definitions carry no inheritance; expansion copies them verbatim.

use super::constraint::Concept;
use super::identifier::Identifier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Namespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub identifier: Identifier,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicitly included concepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
}

impl ValueSet {
    pub fn new(identifier: Identifier, url: impl Into<String>) -> Self {
        Self {
            identifier,
            url: url.into(),
            description: None,
            concepts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSystem {
    pub identifier: Identifier,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
}

impl CodeSystem {
    pub fn new(identifier: Identifier, url: impl Into<String>) -> Self {
        Self {
            identifier,
            url: url.into(),
            description: None,
            concepts: Vec::new(),
        }
    }
}
