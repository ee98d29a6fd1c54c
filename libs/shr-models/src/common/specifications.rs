//! Container grouping every definition of a model
//!
//! Each collection keeps insertion order in a `Vec` and an index from key to
//! position, so lookups are O(1) while iteration stays deterministic.
//! Collections serialize as plain JSON arrays.

use super::data_element::DataElement;
use super::identifier::Identifier;
use super::mapping::ElementMapping;
use super::value_set::{CodeSystem, Namespace, ValueSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Ordered storage with a key index
#[derive(Debug, Clone, PartialEq)]
struct Registry<K: Eq + Hash, V> {
    items: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Registry<K, V> {
    /// Insert or replace (keeping the original position)
    fn insert(&mut self, key: K, item: V) {
        match self.index.get(&key) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(item);
            }
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.items[pos])
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }
}

macro_rules! registry_serde {
    ($specs:ident, $item:ty) => {
        impl From<Vec<$item>> for $specs {
            fn from(items: Vec<$item>) -> Self {
                let mut specs = Self::default();
                for item in items {
                    specs.add(item);
                }
                specs
            }
        }

        impl From<$specs> for Vec<$item> {
            fn from(specs: $specs) -> Self {
                specs.registry.items
            }
        }

        impl $specs {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn all(&self) -> std::slice::Iter<'_, $item> {
                self.registry.items.iter()
            }

            pub fn len(&self) -> usize {
                self.registry.items.len()
            }

            pub fn is_empty(&self) -> bool {
                self.registry.items.is_empty()
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Namespace>", into = "Vec<Namespace>")]
pub struct NamespaceSpecs {
    registry: Registry<String, Namespace>,
}

registry_serde!(NamespaceSpecs, Namespace);

impl NamespaceSpecs {
    pub fn add(&mut self, namespace: Namespace) {
        self.registry.insert(namespace.namespace.clone(), namespace);
    }

    pub fn find(&self, namespace: &str) -> Option<&Namespace> {
        self.registry.get(&namespace.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DataElement>", into = "Vec<DataElement>")]
pub struct DataElementSpecs {
    registry: Registry<Identifier, DataElement>,
}

registry_serde!(DataElementSpecs, DataElement);

impl DataElementSpecs {
    pub fn add(&mut self, element: DataElement) {
        self.registry.insert(element.identifier.clone(), element);
    }

    pub fn find(&self, identifier: &Identifier) -> Option<&DataElement> {
        self.registry.get(identifier)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.registry.contains(identifier)
    }

    pub fn by_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a DataElement> {
        self.all().filter(move |de| de.identifier.namespace == namespace)
    }

    /// Namespaces with at least one element, in first-seen order
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = Vec::new();
        for de in self.all() {
            if !namespaces.contains(&de.identifier.namespace.as_str()) {
                namespaces.push(&de.identifier.namespace);
            }
        }
        namespaces
    }

    pub fn identifiers(&self) -> Vec<Identifier> {
        self.all().map(|de| de.identifier.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ValueSet>", into = "Vec<ValueSet>")]
pub struct ValueSetSpecs {
    registry: Registry<String, ValueSet>,
}

registry_serde!(ValueSetSpecs, ValueSet);

impl ValueSetSpecs {
    pub fn add(&mut self, value_set: ValueSet) {
        self.registry.insert(value_set.url.clone(), value_set);
    }

    pub fn find_by_url(&self, url: &str) -> Option<&ValueSet> {
        self.registry.get(&url.to_string())
    }

    pub fn by_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a ValueSet> {
        self.all().filter(move |vs| vs.identifier.namespace == namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CodeSystem>", into = "Vec<CodeSystem>")]
pub struct CodeSystemSpecs {
    registry: Registry<String, CodeSystem>,
}

registry_serde!(CodeSystemSpecs, CodeSystem);

impl CodeSystemSpecs {
    pub fn add(&mut self, code_system: CodeSystem) {
        self.registry.insert(code_system.url.clone(), code_system);
    }

    pub fn find_by_url(&self, url: &str) -> Option<&CodeSystem> {
        self.registry.get(&url.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ElementMapping>", into = "Vec<ElementMapping>")]
pub struct MapSpecs {
    registry: Registry<(String, Identifier), ElementMapping>,
}

registry_serde!(MapSpecs, ElementMapping);

impl MapSpecs {
    pub fn add(&mut self, mapping: ElementMapping) {
        let key = (mapping.target_spec.clone(), mapping.identifier.clone());
        self.registry.insert(key, mapping);
    }

    /// Target system names, in first-seen order
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for mapping in self.all() {
            if !targets.contains(&mapping.target_spec.as_str()) {
                targets.push(&mapping.target_spec);
            }
        }
        targets
    }

    pub fn by_target<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a ElementMapping> {
        self.all().filter(move |m| m.target_spec == target)
    }

    pub fn find(&self, target: &str, identifier: &Identifier) -> Option<&ElementMapping> {
        self.registry
            .get(&(target.to_string(), identifier.clone()))
    }

    pub fn contains(&self, target: &str, identifier: &Identifier) -> bool {
        self.find(target, identifier).is_some()
    }
}

/// Every definition of a model, unexpanded or expanded
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default)]
    pub namespaces: NamespaceSpecs,
    #[serde(default)]
    pub data_elements: DataElementSpecs,
    #[serde(default)]
    pub value_sets: ValueSetSpecs,
    #[serde(default)]
    pub code_systems: CodeSystemSpecs,
    #[serde(default)]
    pub maps: MapSpecs,
}

impl Specifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON value
    pub fn from_value(value: &serde_json::Value) -> super::error::Result<Self> {
        serde_json::from_value(value.clone()).map_err(super::error::Error::from)
    }
}
