//! Subtype checks over the unexpanded `basedOn` graph

use shr_models::{Identifier, Specifications};
use std::collections::HashSet;

/// Identifiers of primitives and elements that accept code constraints
pub fn code_types() -> [Identifier; 4] {
    [
        Identifier::primitive("code"),
        Identifier::primitive("concept"),
        Identifier::new("shr.core", "Coding"),
        Identifier::new("shr.core", "CodeableConcept"),
    ]
}

/// Every ancestor of `id`, nearest first.
///
/// Primitives have no ancestors; unknown identifiers and cycles simply end
/// the walk.
pub fn recursive_based_ons(specs: &Specifications, id: &Identifier) -> Vec<Identifier> {
    let mut visited = HashSet::new();
    let mut ancestors = Vec::new();
    collect_based_ons(specs, id, &mut visited, &mut ancestors);
    ancestors
}

fn collect_based_ons(
    specs: &Specifications,
    id: &Identifier,
    visited: &mut HashSet<Identifier>,
    ancestors: &mut Vec<Identifier>,
) {
    if id.is_primitive() || !visited.insert(id.clone()) {
        return;
    }

    let Some(element) = specs.data_elements.find(id) else {
        return;
    };

    for base in element.bases() {
        if !visited.contains(base) {
            ancestors.push(base.clone());
        }
        collect_based_ons(specs, base, visited, ancestors);
    }
}

/// Check if `sub` is `sup` or transitively based on it
pub fn is_subtype(specs: &Specifications, sub: &Identifier, sup: &Identifier) -> bool {
    sub == sup || recursive_based_ons(specs, sub).contains(sup)
}

/// Check if `id` is one of `candidates` or based on one of them
pub fn is_based_on_any(specs: &Specifications, id: &Identifier, candidates: &[Identifier]) -> bool {
    if candidates.contains(id) {
        return true;
    }
    let ancestors = recursive_based_ons(specs, id);
    candidates.iter().any(|c| ancestors.contains(c))
}
