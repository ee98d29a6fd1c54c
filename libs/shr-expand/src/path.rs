//! Resolution of constraint paths to the values they address

use crate::config::PathResolution;
use crate::expander::ExpansionRun;
use shr_models::{Constraint, ConstraintsFilter, DataElement, Identifier, Value};

impl<'a> ExpansionRun<'a> {
    /// Value addressed by `path`, relative to `value`.
    ///
    /// `kept` holds the constraints of `value` consolidated so far; type
    /// constraints among them narrow the hops of a deep walk. When the walk
    /// cannot be completed the shallow stand-in is used.
    pub(crate) fn resolve_target(
        &mut self,
        value: &Value,
        kept: &[Constraint],
        path: &[Identifier],
    ) -> Value {
        let Some(last) = path.last() else {
            let mut target = value.clone();
            *target.constraints_mut() = kept.to_vec();
            return target;
        };

        if self.plan.path_resolution == PathResolution::Deep {
            if let Some(target) = self.walk_path(value, kept, path) {
                return target;
            }
            tracing::trace!(path = ?path, "falling back to shallow path target");
        }

        Value::identifiable(last.clone())
    }

    fn walk_path(&mut self, value: &Value, kept: &[Constraint], path: &[Identifier]) -> Option<Value> {
        let filter = ConstraintsFilter::new(kept).with_on_value(false);
        let mut current = filter
            .own()
            .last_type()
            .or_else(|| value.effective_identifier())
            .cloned()?;

        let mut target = None;
        for (i, segment) in path.iter().enumerate() {
            if let Some(previous) = &target {
                current = Value::effective_identifier(previous)?.clone();
            }

            let definition = self.definition_of(&current)?;
            let mut found = find_in_definition(&definition, segment)?;
            if let Some(is_a) = filter.with_path(&path[..=i]).last_type() {
                found.constraints_mut().push(Constraint::type_(is_a.clone()));
            }
            target = Some(found);
        }

        target
    }

    /// The own value of the element `target` embeds
    pub(crate) fn value_of(&mut self, target: &Value) -> Option<Value> {
        let id = target.effective_identifier()?.clone();
        self.definition_of(&id)?.value
    }
}

/// Value or field of `definition` named by `segment`, entering choices
/// through a matching option only
fn find_in_definition(definition: &DataElement, segment: &Identifier) -> Option<Value> {
    if let Some(found) = definition.values().find(|v| v.is_identified_by(segment)) {
        return Some(found.clone());
    }

    definition
        .values()
        .filter_map(Value::as_choice)
        .find_map(|choice| choice.select_option(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ExpansionPlan;
    use crate::{ExpanderConfig, PathResolution};
    use shr_models::{Cardinality, Specifications};

    fn id(name: &str) -> Identifier {
        Identifier::new("shr.test", name)
    }

    fn specs() -> Specifications {
        let mut specs = Specifications::new();
        specs.data_elements.add(
            DataElement::new(id("A"))
                .with_field(Value::identifiable(id("B")).with_min_max(0, Some(1))),
        );
        specs.data_elements.add(
            DataElement::new(id("B"))
                .with_field(Value::identifiable(id("C")).with_min_max(1, None))
                .with_field(
                    Value::choice(vec![
                        Value::identifiable(id("D")),
                        Value::identifiable(id("E")),
                    ])
                    .with_min_max(1, Some(1)),
                ),
        );
        specs.data_elements.add(DataElement::new(id("SubB")).with_based_on(id("B")));
        specs.data_elements.add(DataElement::new(id("C")));
        specs.data_elements.add(DataElement::new(id("D")));
        specs.data_elements.add(DataElement::new(id("E")));
        specs
    }

    fn plan(resolution: PathResolution) -> ExpansionPlan {
        ExpanderConfig::builder()
            .path_resolution(resolution)
            .build()
            .compile()
            .unwrap()
    }

    #[test]
    fn deep_walk_finds_nested_field_with_its_cardinality() {
        let specs = specs();
        let plan = plan(PathResolution::Deep);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("A")).with_min_max(0, Some(1));

        let target = run.resolve_target(&value, &[], &[id("B"), id("C")]);
        assert_eq!(target.identifier(), Some(&id("C")));
        assert_eq!(target.effective_card(), Some(Cardinality::unbounded(1)));
    }

    #[test]
    fn deep_walk_applies_type_constraints_at_prefixes() {
        let specs = specs();
        let plan = plan(PathResolution::Deep);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("A")).with_min_max(0, Some(1));
        let kept = vec![Constraint::type_(id("SubB")).with_path(vec![id("B")])];

        let target = run.resolve_target(&value, &kept, &[id("B")]);
        assert_eq!(target.effective_identifier(), Some(&id("SubB")));

        let nested = run.resolve_target(&value, &kept, &[id("B"), id("C")]);
        assert_eq!(nested.identifier(), Some(&id("C")));
    }

    #[test]
    fn deep_walk_enters_choices_through_options() {
        let specs = specs();
        let plan = plan(PathResolution::Deep);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("B")).with_min_max(0, Some(1));

        let target = run.resolve_target(&value, &[], &[id("E")]);
        assert_eq!(target.identifier(), Some(&id("E")));
        assert_eq!(target.card(), Some(Cardinality::bounded(0, 1)));
    }

    #[test]
    fn unresolvable_paths_fall_back_to_stand_in() {
        let specs = specs();
        let plan = plan(PathResolution::Deep);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("A")).with_min_max(0, Some(1));

        let target = run.resolve_target(&value, &[], &[id("Missing")]);
        assert_eq!(target, Value::identifiable(id("Missing")));
    }

    #[test]
    fn shallow_resolution_uses_last_segment() {
        let specs = specs();
        let plan = plan(PathResolution::Shallow);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("A")).with_min_max(0, Some(1));

        let target = run.resolve_target(&value, &[], &[id("B"), id("C")]);
        assert_eq!(target, Value::identifiable(id("C")));
        assert_eq!(target.card(), None);
    }

    #[test]
    fn empty_path_targets_the_value_itself() {
        let specs = specs();
        let plan = plan(PathResolution::Deep);
        let mut run = ExpansionRun::new(&plan, &specs);
        let value = Value::identifiable(id("B")).with_min_max(0, Some(1));
        let kept = vec![Constraint::type_(id("SubB"))];

        let target = run.resolve_target(&value, &kept, &[]);
        assert_eq!(target.effective_identifier(), Some(&id("SubB")));
        assert_eq!(target.card(), Some(Cardinality::bounded(0, 1)));
    }
}
