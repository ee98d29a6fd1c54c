use crate::config::ExpanderConfig;
use crate::error::Result;
use crate::inheritance::recursive_based_ons;
use crate::issue::{ExpansionIssue, ExpansionOutcome, IssueKind};
use crate::plan::ExpansionPlan;
use crate::spec_filter::SpecificationsFilter;
use shr_models::{DataElement, Identifier, Specifications, Value};
use std::collections::HashSet;

/// Reusable expander - owns the compiled plan
#[derive(Debug, Clone, Default)]
pub struct Expander {
    plan: ExpansionPlan,
}

impl Expander {
    pub fn new(plan: ExpansionPlan) -> Self {
        Self { plan }
    }

    pub fn from_config(config: &ExpanderConfig) -> Result<Self> {
        Ok(Self::new(config.compile()?))
    }

    /// Expand every data element (and mapping) of `specs`.
    ///
    /// The input is never modified; the expanded model is built from clones.
    pub fn expand(&self, specs: &Specifications) -> ExpansionOutcome {
        ExpansionRun::new(&self.plan, specs).execute()
    }

    pub fn plan(&self) -> &ExpansionPlan {
        &self.plan
    }
}

/// Short-lived expansion execution
pub(crate) struct ExpansionRun<'a> {
    pub(crate) plan: &'a ExpansionPlan,
    pub(crate) unexpanded: &'a Specifications,
    pub(crate) expanded: Specifications,
    /// Elements whose expansion has started but not finished, outermost first
    pub(crate) in_progress: Vec<Identifier>,
    /// (target, element) pairs known to have no mapping
    pub(crate) unmapped: HashSet<(String, Identifier)>,
    pub(crate) issues: Vec<ExpansionIssue>,
}

impl<'a> ExpansionRun<'a> {
    pub(crate) fn new(plan: &'a ExpansionPlan, unexpanded: &'a Specifications) -> Self {
        Self {
            plan,
            unexpanded,
            expanded: Specifications::new(),
            in_progress: Vec::new(),
            unmapped: HashSet::new(),
            issues: Vec::new(),
        }
    }

    fn execute(mut self) -> ExpansionOutcome {
        self.expanded.namespaces = self.unexpanded.namespaces.clone();
        self.expanded.value_sets = self.unexpanded.value_sets.clone();
        self.expanded.code_systems = self.unexpanded.code_systems.clone();

        let unexpanded = self.unexpanded;
        for element in unexpanded.data_elements.all() {
            self.expand_element(element);
        }

        let plan = self.plan;
        if let Some(mapping_plan) = &plan.mappings {
            self.expand_mappings(mapping_plan);
        }

        let mut specifications = self.expanded;
        if let Some(filter) = &plan.filter {
            let outcome = SpecificationsFilter::new(filter.clone()).apply(&specifications);
            specifications = outcome.specifications;
        }

        let outcome = ExpansionOutcome {
            specifications,
            issues: self.issues,
        };

        tracing::info!(
            elements = outcome.specifications.data_elements.len(),
            maps = outcome.specifications.maps.len(),
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            "expansion complete"
        );

        outcome
    }

    pub(crate) fn error(&mut self, element: &Identifier, kind: IssueKind, message: String) {
        tracing::debug!(element = %element, %kind, "{}", message);
        self.issues
            .push(ExpansionIssue::error(kind, message).with_element(element.clone()));
    }

    pub(crate) fn warning(&mut self, element: &Identifier, kind: IssueKind, message: String) {
        tracing::debug!(element = %element, %kind, "{}", message);
        self.issues
            .push(ExpansionIssue::warning(kind, message).with_element(element.clone()));
    }

    /// Expand `element` (and, first, its base) unless already done
    pub(crate) fn expand_element(&mut self, element: &'a DataElement) {
        let id = &element.identifier;
        if self.expanded.data_elements.contains(id) || self.in_progress.contains(id) {
            return;
        }

        self.in_progress.push(id.clone());
        tracing::debug!(element = %id, "expanding element");

        let bases: Vec<&Identifier> = element.bases().collect();
        if bases.len() > 1 {
            self.error(
                id,
                IssueKind::Merge,
                format!(
                    "{}: multiple inheritance is not supported, using only {}",
                    id, bases[0]
                ),
            );
        }
        let base = match bases.first() {
            Some(base_id) => self.resolve_base(id, base_id),
            None => None,
        };

        let mut value: Option<Value> = None;
        let mut fields: Vec<Value> = Vec::new();
        let mut hierarchy = Vec::new();

        if let Some(base) = base {
            hierarchy = base.hierarchy;
            hierarchy.push(base.identifier);
            value = base.value;
            fields = base.fields;
        }

        if let Some(own) = &element.value {
            value = match value {
                None => Some(self.seed(id, own)),
                Some(merged) => self.merge_value(id, &merged, own),
            };
        }

        for field in &element.fields {
            match self.find_matching_field(&fields, field) {
                Some(pos) => {
                    if let Some(merged) = self.merge_value(id, &fields[pos], field) {
                        fields[pos] = merged;
                    }
                }
                None => {
                    let seeded = self.seed(id, field);
                    fields.push(seeded);
                }
            }
        }

        if let Some(Value::Incomplete(incomplete)) = &value {
            self.error(
                id,
                IssueKind::Reference,
                format!(
                    "{}: constrains value {}, but no base declares it",
                    id, incomplete.identifier
                ),
            );
            value = None;
        }

        let mut kept = Vec::with_capacity(fields.len());
        for field in fields {
            if let Value::Incomplete(incomplete) = &field {
                self.error(
                    id,
                    IssueKind::Reference,
                    format!(
                        "{}: constrains field {}, but no base declares it",
                        id, incomplete.identifier
                    ),
                );
                continue;
            }
            kept.push(field);
        }

        let mut expanded = element.clone();
        expanded.value = value;
        expanded.fields = kept;
        expanded.hierarchy = hierarchy;

        self.in_progress.pop();
        self.expanded.data_elements.add(expanded);
    }

    /// Expanded definition of the base `base_id` of `id`
    fn resolve_base(&mut self, id: &Identifier, base_id: &Identifier) -> Option<DataElement> {
        if let Some(start) = self.in_progress.iter().position(|p| p == base_id) {
            let chain = self.in_progress[start..]
                .iter()
                .chain(std::iter::once(base_id))
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            self.error(
                id,
                IssueKind::Cycle,
                format!("{}: Circular basedOn reference: {}", id, chain),
            );
            return None;
        }

        if let Some(expanded) = self.expanded.data_elements.find(base_id) {
            return Some(expanded.clone());
        }

        let unexpanded = self.unexpanded;
        match unexpanded.data_elements.find(base_id) {
            Some(base) => {
                self.expand_element(base);
                self.expanded.data_elements.find(base_id).cloned()
            }
            None => {
                self.error(
                    id,
                    IssueKind::Reference,
                    format!("{}: Reference to non-existing base: {}", id, base_id),
                );
                None
            }
        }
    }

    /// Clone a value seen for the first time in the hierarchy
    fn seed(&mut self, id: &Identifier, value: &Value) -> Value {
        if value.card().is_none() && !value.is_tbd() && !value.is_incomplete() {
            self.error(
                id,
                IssueKind::Merge,
                format!("{}: No cardinality found for value: {}", id, value),
            );
        }
        value.clone()
    }

    /// Position of the merged field `field` overrides, if any
    fn find_matching_field(&self, fields: &[Value], field: &Value) -> Option<usize> {
        let field_id = field.identifier()?;

        fields
            .iter()
            .position(|f| f.is_identified_by(field_id))
            .or_else(|| {
                fields.iter().position(|f| {
                    f.as_choice()
                        .map(|choice| choice.has_option(field_id))
                        .unwrap_or(false)
                })
            })
    }

    /// Definition used to resolve paths through `id`.
    ///
    /// Returns the expanded element, expanding it on demand. When expanding
    /// `id` now would re-enter an element still being expanded (`id` itself
    /// or one of its ancestors), its unexpanded definition stands in and `id`
    /// is left for the regular pass.
    pub(crate) fn definition_of(&mut self, id: &Identifier) -> Option<DataElement> {
        if let Some(expanded) = self.expanded.data_elements.find(id) {
            return Some(expanded.clone());
        }

        let unexpanded = self.unexpanded;
        let element = unexpanded.data_elements.find(id)?;
        if self.reenters_in_progress(id) {
            tracing::trace!(element = %id, "using unexpanded definition");
            return Some(element.clone());
        }

        self.expand_element(element);
        self.expanded.data_elements.find(id).cloned()
    }

    fn reenters_in_progress(&self, id: &Identifier) -> bool {
        self.in_progress.contains(id)
            || recursive_based_ons(self.unexpanded, id)
                .iter()
                .any(|base| self.in_progress.contains(base))
    }
}
