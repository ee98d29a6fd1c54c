//! Post-expansion filtering of a model down to selected elements
//!
//! The filter keeps the selected root elements plus everything they depend
//! on, so the result is still self-contained.

use crate::config::{FilterConfig, FilterStrategy};
use shr_models::{ConstraintKind, DataElement, Identifier, Specifications, Value};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub specifications: Specifications,
    /// Targets that selected nothing
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SpecificationsFilter {
    config: FilterConfig,
}

impl SpecificationsFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn apply(&self, specs: &Specifications) -> FilterOutcome {
        let (roots, unmatched) = self.select_roots(specs);
        for target in &unmatched {
            tracing::warn!(
                strategy = ?self.config.strategy,
                filter_target = %target,
                "filter target matched no data elements"
            );
        }

        let kept = dependency_closure(specs, roots);

        let mut filtered = Specifications::new();
        let mut namespaces: HashSet<&str> = HashSet::new();
        let mut value_set_urls: HashSet<&str> = HashSet::new();
        let mut systems: HashSet<&str> = HashSet::new();

        for element in specs.data_elements.all() {
            if !kept.contains(&element.identifier) {
                continue;
            }
            namespaces.insert(element.identifier.namespace.as_str());
            systems.extend(element.concepts.iter().map(|c| c.system.as_str()));
            for value in element.values() {
                collect_terminology(value, &mut value_set_urls, &mut systems);
            }
            filtered.data_elements.add(element.clone());
        }

        for value_set in specs.value_sets.all() {
            if value_set_urls.contains(value_set.url.as_str()) {
                systems.extend(value_set.concepts.iter().map(|c| c.system.as_str()));
                filtered.value_sets.add(value_set.clone());
            }
        }

        for code_system in specs.code_systems.all() {
            if systems.contains(code_system.url.as_str()) {
                filtered.code_systems.add(code_system.clone());
            }
        }

        for namespace in specs.namespaces.all() {
            if namespaces.contains(namespace.namespace.as_str()) {
                filtered.namespaces.add(namespace.clone());
            }
        }

        for mapping in specs.maps.all() {
            if kept.contains(&mapping.identifier) {
                filtered.maps.add(mapping.clone());
            }
        }

        tracing::info!(
            kept = filtered.data_elements.len(),
            total = specs.data_elements.len(),
            "filtered specifications"
        );

        FilterOutcome {
            specifications: filtered,
            unmatched,
        }
    }

    /// Root elements selected by the configured targets, and the targets
    /// that selected nothing
    fn select_roots(&self, specs: &Specifications) -> (Vec<Identifier>, Vec<String>) {
        let mut roots = Vec::new();
        let mut unmatched = Vec::new();

        for target in &self.config.targets {
            let by_element = || {
                target
                    .parse::<Identifier>()
                    .ok()
                    .filter(|id| specs.data_elements.contains(id))
                    .into_iter()
                    .collect::<Vec<_>>()
            };
            let by_namespace = || {
                specs
                    .data_elements
                    .by_namespace(target)
                    .map(|de| de.identifier.clone())
                    .collect::<Vec<_>>()
            };

            let selected = match self.config.strategy {
                FilterStrategy::Element => by_element(),
                FilterStrategy::Namespace => by_namespace(),
                FilterStrategy::Hybrid => {
                    let mut ids = by_element();
                    ids.extend(by_namespace());
                    ids
                }
            };

            if selected.is_empty() {
                unmatched.push(target.clone());
            }
            roots.extend(selected);
        }

        (roots, unmatched)
    }
}

/// `roots` plus every element they transitively depend on
fn dependency_closure(specs: &Specifications, roots: Vec<Identifier>) -> HashSet<Identifier> {
    let mut kept = HashSet::new();
    let mut queue: VecDeque<Identifier> = roots.into();

    while let Some(id) = queue.pop_front() {
        if !kept.insert(id.clone()) {
            continue;
        }
        let Some(element) = specs.data_elements.find(&id) else {
            continue;
        };
        for dependency in dependencies(element) {
            if !kept.contains(&dependency) && specs.data_elements.contains(&dependency) {
                queue.push_back(dependency);
            }
        }
    }

    kept
}

fn dependencies(element: &DataElement) -> Vec<Identifier> {
    let mut deps: Vec<Identifier> = element.bases().cloned().collect();
    for value in element.values() {
        collect_value_dependencies(value, &mut deps);
    }
    deps
}

fn collect_value_dependencies(value: &Value, deps: &mut Vec<Identifier>) {
    if let Some(id) = value.identifier() {
        deps.push(id.clone());
    }
    if let Value::Choice(choice) = value {
        for option in &choice.options {
            collect_value_dependencies(option, deps);
        }
    }

    for constraint in value.constraints() {
        deps.extend(constraint.path.iter().cloned());
        match &constraint.kind {
            ConstraintKind::Type { is_a } | ConstraintKind::IncludesType { is_a, .. } => {
                deps.push(is_a.clone())
            }
            ConstraintKind::Card { .. }
            | ConstraintKind::ValueSet { .. }
            | ConstraintKind::Code { .. }
            | ConstraintKind::IncludesCode { .. }
            | ConstraintKind::Boolean { .. } => {}
        }
    }
}

fn collect_terminology<'s>(
    value: &'s Value,
    value_sets: &mut HashSet<&'s str>,
    systems: &mut HashSet<&'s str>,
) {
    if let Value::Choice(choice) = value {
        for option in &choice.options {
            collect_terminology(option, value_sets, systems);
        }
    }

    for constraint in value.constraints() {
        match &constraint.kind {
            ConstraintKind::ValueSet { uri, .. } => {
                value_sets.insert(uri.as_str());
            }
            ConstraintKind::Code { code } | ConstraintKind::IncludesCode { code } => {
                systems.insert(code.system.as_str());
            }
            _ => {}
        }
    }
}
