//! Identifiers for data elements and primitive types

use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved namespace holding the built-in scalar types
pub const PRIMITIVE_NS: &str = "primitive";

/// Keyword referring to an element's own value in mapping source paths
pub const VALUE_KEYWORD: &str = "Value";

/// Keyword referring to entry metadata in mapping source paths
pub const ENTRY_KEYWORD: &str = "Entry";

/// Names of the primitive types known to the grammar
pub const PRIMITIVES: &[&str] = &[
    "boolean",
    "integer",
    "decimal",
    "unsignedInt",
    "positiveInt",
    "string",
    "markdown",
    "code",
    "id",
    "oid",
    "uri",
    "base64Binary",
    "instant",
    "date",
    "dateTime",
    "time",
    "concept",
    "xhtml",
];

/// A (namespace, name) pair identifying a data element or primitive type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// Namespace; `primitive` for built-in types, empty when unqualified
    #[serde(default)]
    pub namespace: String,

    /// Simple name within the namespace
    pub name: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Create an identifier in the primitive namespace
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(PRIMITIVE_NS, name)
    }

    /// Create an identifier without a namespace (resolved later by name)
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    pub fn value_keyword() -> Self {
        Self::unqualified(VALUE_KEYWORD)
    }

    pub fn entry_keyword() -> Self {
        Self::unqualified(ENTRY_KEYWORD)
    }

    pub fn is_primitive(&self) -> bool {
        self.namespace == PRIMITIVE_NS
    }

    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }

    pub fn is_value_keyword(&self) -> bool {
        self.is_unqualified() && self.name == VALUE_KEYWORD
    }

    pub fn is_entry_keyword(&self) -> bool {
        self.is_unqualified() && self.name == ENTRY_KEYWORD
    }

    /// Check if this is one of the special mapping path keywords
    pub fn is_keyword(&self) -> bool {
        self.is_value_keyword() || self.is_entry_keyword()
    }

    /// Fully qualified name (`namespace.name`)
    pub fn fqn(&self) -> String {
        if self.is_unqualified() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Check whether `self` can stand for `other`: equal, or an unqualified
    /// name equal to `other`'s name
    pub fn matches(&self, other: &Identifier) -> bool {
        self == other || (self.is_unqualified() && self.name == other.name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_primitive() || self.is_unqualified() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidIdentifier("empty identifier".into()));
        }

        match s.rsplit_once('.') {
            Some((namespace, name)) => {
                if namespace.is_empty() || name.is_empty() {
                    return Err(Error::InvalidIdentifier(s.to_string()));
                }
                Ok(Self::new(namespace, name))
            }
            None if PRIMITIVES.contains(&s) => Ok(Self::primitive(s)),
            None => Ok(Self::unqualified(s)),
        }
    }
}
