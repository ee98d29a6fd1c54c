//! Mapping expansion
//!
//! Mappings follow the same inheritance graph as data elements: an element
//! without a mapping of its own passes its parent's mapping through, and an
//! element with one folds its own rules over the rules it inherits.

use crate::expander::ExpansionRun;
use crate::issue::IssueKind;
use crate::plan::MappingPlan;
use shr_models::{DataElement, ElementMapping, Identifier, MappingRule, Value};

impl<'a> ExpansionRun<'a> {
    pub(crate) fn expand_mappings(&mut self, plan: &MappingPlan) {
        let unexpanded = self.unexpanded;

        for target in unexpanded.maps.targets() {
            for mapping in unexpanded.maps.by_target(target) {
                if !self.expanded.data_elements.contains(&mapping.identifier) {
                    self.error(
                        &mapping.identifier,
                        IssueKind::Mapping,
                        format!("Cannot find definition for {}", mapping.identifier),
                    );
                    continue;
                }
                self.expand_mapping(target, &mapping.identifier);
            }

            if plan.inherit_to_unmapped {
                for id in self.expanded.data_elements.identifiers() {
                    self.expand_mapping(target, &id);
                }
            }
        }
    }

    /// Expanded mapping of `id` onto `target`, if it has one
    pub(crate) fn expand_mapping(&mut self, target: &str, id: &Identifier) -> Option<ElementMapping> {
        if let Some(done) = self.expanded.maps.find(target, id) {
            return Some(done.clone());
        }

        let key = (target.to_string(), id.clone());
        if self.unmapped.contains(&key) {
            return None;
        }

        let element = self.expanded.data_elements.find(id).cloned()?;
        let inherited = match element.parent() {
            Some(parent) => self.expand_mapping(target, parent),
            None => None,
        };

        let unexpanded = self.unexpanded;
        let Some(own) = unexpanded.maps.find(target, id) else {
            return match inherited {
                Some(mut mapping) => {
                    tracing::debug!(element = %id, target_spec = target, "inheriting mapping");
                    mapping.identifier = id.clone();
                    self.expanded.maps.add(mapping.clone());
                    Some(mapping)
                }
                None => {
                    self.unmapped.insert(key);
                    None
                }
            };
        };

        tracing::debug!(element = %id, target_spec = target, "expanding mapping");

        let mut target_item = own.target_item.clone();
        let mut rules = Vec::new();
        if let Some(base) = inherited {
            if let (Some(mine), Some(theirs)) = (&own.target_item, &base.target_item) {
                if mine != theirs {
                    self.warning(
                        id,
                        IssueKind::Mapping,
                        format!(
                            "{}: maps to {}, but based on class {} maps to {}",
                            id,
                            mine,
                            element.parent().map(|p| p.to_string()).unwrap_or_default(),
                            theirs
                        ),
                    );
                }
            }
            if target_item.is_none() {
                target_item = base.target_item;
            }
            rules = base.rules;
        }

        for rule in &own.rules {
            let Some(resolved) = self.resolve_rule(&element, target, rule) else {
                continue;
            };
            match rules.iter().position(|r| r.same_slot(&resolved)) {
                Some(pos) => rules[pos] = resolved,
                None => rules.push(resolved),
            }
        }

        let Some(target_item) = target_item else {
            self.error(
                id,
                IssueKind::Mapping,
                format!("{}: cannot determine target item", id),
            );
            self.unmapped.insert(key);
            return None;
        };

        let mut expanded = own.clone();
        expanded.target_item = Some(target_item);
        expanded.rules = rules;
        self.expanded.maps.add(expanded.clone());
        Some(expanded)
    }

    fn resolve_rule(
        &mut self,
        element: &DataElement,
        target: &str,
        rule: &MappingRule,
    ) -> Option<MappingRule> {
        match rule {
            MappingRule::Field {
                source_path,
                target: field,
            } => {
                let resolved = self.resolve_source_path(element, target, rule, source_path)?;
                Some(MappingRule::field(resolved, field.clone()))
            }
            MappingRule::Cardinality { .. } | MappingRule::FixedValue { .. } => Some(rule.clone()),
        }
    }

    /// Qualify every segment of `path`, walking from `element` through the
    /// definitions of the segments matched so far
    fn resolve_source_path(
        &mut self,
        element: &DataElement,
        target: &str,
        rule: &MappingRule,
        path: &[Identifier],
    ) -> Option<Vec<Identifier>> {
        let id = &element.identifier;
        let mut resolved = Vec::with_capacity(path.len());
        let mut scope = Some(element.clone());
        let mut verbatim = false;

        for segment in path {
            if verbatim {
                resolved.push(segment.clone());
                continue;
            }

            let Some(current) = scope.take() else {
                self.error(
                    id,
                    IssueKind::Mapping,
                    format!(
                        "{}: Cannot resolve {} in {} mapping rule \"{}\": {} has no fields",
                        id,
                        segment,
                        target,
                        rule,
                        resolved.last().map(|p: &Identifier| p.to_string()).unwrap_or_default()
                    ),
                );
                return None;
            };

            if segment.is_entry_keyword() {
                resolved.push(segment.clone());
                verbatim = true;
                continue;
            }

            if segment.is_value_keyword() {
                resolved.push(segment.clone());
                match current.value.as_ref().and_then(Value::effective_identifier) {
                    Some(value_id) => scope = self.expanded.data_elements.find(value_id).cloned(),
                    None => verbatim = true,
                }
                continue;
            }

            let known = candidates(&current);
            let matches: Vec<&Identifier> = known.iter().filter(|c| segment.matches(c)).collect();
            let Some(found) = matches.first().map(|m| (*m).clone()) else {
                self.error(
                    id,
                    IssueKind::Mapping,
                    format!(
                        "{}: Cannot resolve element definition for {} in {} mapping rule \"{}\"",
                        id, segment, target, rule
                    ),
                );
                return None;
            };

            if matches.len() > 1 {
                let names = matches.iter().map(|m| m.to_string()).collect::<Vec<_>>();
                self.error(
                    id,
                    IssueKind::Mapping,
                    format!(
                        "{}: {} is ambiguous in {} mapping rule \"{}\" (matches {}), using {}",
                        id,
                        segment,
                        target,
                        rule,
                        names.join(", "),
                        found
                    ),
                );
            }

            scope = self.expanded.data_elements.find(&found).cloned();
            resolved.push(found);
        }

        Some(resolved)
    }
}

/// Identifiers a source path segment may name within `element`
fn candidates(element: &DataElement) -> Vec<Identifier> {
    let mut ids: Vec<Identifier> = Vec::new();
    let mut add = |id: &Identifier| {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    };

    for value in element.values() {
        match value {
            Value::Choice(choice) => {
                for option in choice.aggregate_options() {
                    if let Some(id) = option.identifier() {
                        add(id);
                    }
                }
            }
            _ => {
                if let Some(id) = value.identifier() {
                    add(id);
                }
                if let Some(id) = value.effective_identifier() {
                    add(id);
                }
            }
        }
    }

    ids
}
