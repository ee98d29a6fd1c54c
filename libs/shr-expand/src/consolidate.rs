//! Constraint consolidation
//!
//! Walks a value's constraints in declaration order and rebuilds the list,
//! checking each constraint against its target and against the constraints
//! already kept at the same path. A constraint that fails its checks is
//! reported and dropped; the others are unaffected.

use crate::expander::ExpansionRun;
use crate::inheritance::{code_types, is_based_on_any, is_subtype};
use crate::issue::IssueKind;
use shr_models::{
    BindingStrength, Cardinality, Concept, Constraint, ConstraintKind, ConstraintTag,
    ConstraintsFilter, Identifier, Specifications, Value,
};

/// State of one consolidation pass over a value
struct Pass<'v> {
    element: &'v Identifier,
    /// The value with its constraints taken out
    value: &'v Value,
    kept: Vec<Constraint>,
}

impl Pass<'_> {
    fn previous(&self, constraint: &Constraint) -> ConstraintsFilter<'_> {
        ConstraintsFilter::new(&self.kept).same_target(constraint)
    }

    /// Drop kept constraints of kind `tag` aimed at the same target
    fn supersede(&mut self, constraint: &Constraint, tag: ConstraintTag) {
        self.kept
            .retain(|c| !(c.tag() == tag && c.same_target(constraint)));
    }

    fn target_name(&self, constraint: &Constraint) -> String {
        let name = if constraint.path.is_empty() {
            self.value.to_string()
        } else {
            constraint.path_string()
        };

        if constraint.on_value {
            format!("value of {}", name)
        } else {
            name
        }
    }
}

impl<'a> ExpansionRun<'a> {
    /// Check and de-duplicate the constraints of `value`, declared on `element`
    pub(crate) fn consolidate_constraints(&mut self, element: &Identifier, mut value: Value) -> Value {
        let pending = std::mem::take(value.constraints_mut());

        let kept = {
            let mut pass = Pass {
                element,
                value: &value,
                kept: Vec::with_capacity(pending.len()),
            };

            for constraint in pending {
                match constraint.kind.clone() {
                    ConstraintKind::Card { card } => self.consolidate_card(&mut pass, constraint, card),
                    ConstraintKind::Type { is_a } => self.consolidate_type(&mut pass, constraint, is_a),
                    ConstraintKind::ValueSet { uri, strength } => {
                        self.consolidate_value_set(&mut pass, constraint, uri, strength)
                    }
                    ConstraintKind::Code { code } => self.consolidate_code(&mut pass, constraint, code),
                    ConstraintKind::IncludesCode { code } => {
                        self.consolidate_includes_code(&mut pass, constraint, code)
                    }
                    ConstraintKind::IncludesType { is_a, card } => {
                        self.consolidate_includes_type(&mut pass, constraint, is_a, card)
                    }
                    ConstraintKind::Boolean { value } => {
                        self.consolidate_boolean(&mut pass, constraint, value)
                    }
                }
            }

            pass.kept
        };

        *value.constraints_mut() = kept;
        value
    }

    fn merge_error(&mut self, pass: &Pass<'_>, message: String) {
        let element = pass.element;
        self.error(element, IssueKind::Merge, format!("{}: {}", element, message));
    }

    /// Target of `constraint`, following `on_value` into the target's value
    fn constrained_target(&mut self, pass: &Pass<'_>, constraint: &Constraint) -> Option<Value> {
        let target = self.resolve_target(pass.value, &pass.kept, &constraint.path);
        if constraint.on_value {
            self.value_of(&target)
        } else {
            Some(target)
        }
    }

    /// Where a code-like constraint applies: `Some(false)` for the target
    /// itself, `Some(true)` for the target's value, `None` if neither accepts it
    fn coded_target(
        &mut self,
        pass: &Pass<'_>,
        constraint: &Constraint,
        accepted: &[Identifier],
    ) -> Option<bool> {
        let target = self.resolve_target(pass.value, &pass.kept, &constraint.path);
        if !constraint.on_value && accepts(self.unexpanded, &target, accepted) {
            return Some(false);
        }

        self.value_of(&target)
            .filter(|inner| accepts(self.unexpanded, inner, accepted))
            .map(|_| true)
    }

    fn consolidate_card(&mut self, pass: &mut Pass<'_>, constraint: Constraint, card: Cardinality) {
        let name = pass.target_name(&constraint);
        let target_card = if constraint.path.is_empty() && !constraint.on_value {
            pass.value.card()
        } else {
            self.constrained_target(pass, &constraint)
                .and_then(|target| target.effective_card())
        };

        if let Some(target_card) = target_card {
            if !card.fits_within(&target_card) {
                self.merge_error(
                    pass,
                    format!(
                        "Cannot constrain cardinality of {} from {} to {}",
                        name, target_card, card
                    ),
                );
                return;
            }
        }

        let previous = pass.previous(&constraint).last_card();
        if let Some(previous) = previous {
            if !card.fits_within(&previous) {
                self.merge_error(
                    pass,
                    format!(
                        "Cannot further constrain cardinality of {} from {} to {}",
                        name, previous, card
                    ),
                );
                return;
            }
            pass.supersede(&constraint, ConstraintTag::Card);
        }

        pass.kept.push(constraint);
    }

    fn consolidate_type(&mut self, pass: &mut Pass<'_>, mut constraint: Constraint, is_a: Identifier) {
        let mut target = self.resolve_target(pass.value, &pass.kept, &constraint.path);

        if constraint.on_value {
            let Some(inner) = self.value_of(&target) else {
                let name = pass.target_name(&constraint);
                self.merge_error(
                    pass,
                    format!("Cannot constrain type of {} to {}: it has no value", name, is_a),
                );
                return;
            };

            if let Some(inner_id) = inner.identifier() {
                constraint.on_value = false;
                constraint.path.push(inner_id.clone());
            }
            target = inner;
        }

        let name = pass.target_name(&constraint);
        let compatible = match &target {
            Value::Choice(choice) => choice.aggregate_options().iter().any(|option| {
                option
                    .identifier()
                    .map(|id| is_subtype(self.unexpanded, &is_a, id))
                    .unwrap_or(false)
            }),
            _ => match target.identifier() {
                Some(target_id) => is_subtype(self.unexpanded, &is_a, target_id),
                None => {
                    self.merge_error(
                        pass,
                        format!(
                            "Cannot constrain type of {} to {}: {} has no identifier",
                            name, is_a, name
                        ),
                    );
                    return;
                }
            },
        };

        if !compatible {
            self.merge_error(pass, format!("Cannot constrain type of {} to {}", name, is_a));
            return;
        }

        let previous = pass.previous(&constraint).last_type().cloned();
        if let Some(previous) = previous {
            if !is_subtype(self.unexpanded, &is_a, &previous) {
                self.merge_error(
                    pass,
                    format!(
                        "Cannot further constrain type of {} from {} to {}",
                        name, previous, is_a
                    ),
                );
                return;
            }
            pass.supersede(&constraint, ConstraintTag::Type);
        }

        pass.kept.push(constraint);
    }

    fn consolidate_value_set(
        &mut self,
        pass: &mut Pass<'_>,
        mut constraint: Constraint,
        uri: String,
        strength: BindingStrength,
    ) {
        let name = pass.target_name(&constraint);
        let Some(on_value) = self.coded_target(pass, &constraint, &code_types()) else {
            self.merge_error(
                pass,
                format!(
                    "Cannot constrain value set of {} to {}: it is not based on code, Coding or CodeableConcept",
                    name, uri
                ),
            );
            return;
        };
        constraint.on_value = on_value;

        let fixed = pass.previous(&constraint).code().last().cloned();
        if let Some(code) = fixed {
            self.merge_error(
                pass,
                format!(
                    "Cannot constrain value set of {} to {} ({}): it is already constrained to a single code ({})",
                    name, uri, strength, code_of(&code)
                ),
            );
            return;
        }

        pass.supersede(&constraint, ConstraintTag::ValueSet);
        pass.kept.push(constraint);
    }

    fn consolidate_code(&mut self, pass: &mut Pass<'_>, mut constraint: Constraint, code: Concept) {
        let Some(on_value) = self.coded_target(pass, &constraint, &code_types()) else {
            let name = pass.target_name(&constraint);
            self.merge_error(
                pass,
                format!(
                    "Cannot fix code of {} to {}: it is not based on code, Coding or CodeableConcept",
                    name, code
                ),
            );
            return;
        };
        constraint.on_value = on_value;

        pass.supersede(&constraint, ConstraintTag::Code);
        pass.kept.push(constraint);
    }

    fn consolidate_includes_code(
        &mut self,
        pass: &mut Pass<'_>,
        mut constraint: Constraint,
        code: Concept,
    ) {
        let Some(on_value) = self.coded_target(pass, &constraint, &code_types()) else {
            let name = pass.target_name(&constraint);
            self.merge_error(
                pass,
                format!(
                    "Cannot include code {} in {}: it is not based on code, Coding or CodeableConcept",
                    code, name
                ),
            );
            return;
        };
        constraint.on_value = on_value;

        let duplicate = pass.previous(&constraint).includes_code().iter().any(|c| {
            matches!(&c.kind, ConstraintKind::IncludesCode { code: existing } if *existing == code)
        });
        if !duplicate {
            pass.kept.push(constraint);
        }
    }

    fn consolidate_includes_type(
        &mut self,
        pass: &mut Pass<'_>,
        constraint: Constraint,
        is_a: Identifier,
        card: Cardinality,
    ) {
        let name = pass.target_name(&constraint);
        let target_card = self
            .constrained_target(pass, &constraint)
            .and_then(|target| target.effective_card());

        if let Some(target_card) = target_card {
            if !target_card.is_list() {
                self.merge_error(
                    pass,
                    format!(
                        "Cannot include {} {} in {}: cardinality {} is not a list",
                        card, is_a, name, target_card
                    ),
                );
                return;
            }
        }

        pass.kept.retain(|c| {
            !(c.same_target(&constraint)
                && matches!(&c.kind, ConstraintKind::IncludesType { is_a: existing, .. } if *existing == is_a))
        });
        pass.kept.push(constraint);
    }

    fn consolidate_boolean(&mut self, pass: &mut Pass<'_>, mut constraint: Constraint, value: bool) {
        let name = pass.target_name(&constraint);
        let Some(on_value) = self.coded_target(pass, &constraint, &[Identifier::primitive("boolean")])
        else {
            self.merge_error(
                pass,
                format!("Cannot constrain {} to {}: it is not a boolean", name, value),
            );
            return;
        };
        constraint.on_value = on_value;

        let previous = pass.previous(&constraint).boolean().last().map(|c| c.kind.clone());
        match previous {
            Some(ConstraintKind::Boolean { value: prev }) if prev != value => {
                self.merge_error(
                    pass,
                    format!(
                        "Cannot constrain {} to {}: it is already constrained to {}",
                        name, value, prev
                    ),
                );
            }
            Some(_) => {}
            None => pass.kept.push(constraint),
        }
    }
}

fn code_of(constraint: &Constraint) -> String {
    match &constraint.kind {
        ConstraintKind::Code { code } => code.to_string(),
        _ => constraint.to_string(),
    }
}

/// Check if `value` (or, for choices, any option) is based on one of `accepted`
fn accepts(specs: &Specifications, value: &Value, accepted: &[Identifier]) -> bool {
    match value {
        Value::Choice(choice) => choice
            .aggregate_options()
            .into_iter()
            .any(|option| accepts(specs, option, accepted)),
        _ => value
            .effective_identifier()
            .map(|id| is_based_on_any(specs, id, accepted))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Expander, ExpansionOutcome};
    use shr_models::*;

    fn id(name: &str) -> Identifier {
        Identifier::new("shr.test", name)
    }

    fn base_specs() -> Specifications {
        let mut specs = Specifications::new();
        specs.data_elements.add(DataElement::new(id("B")));
        specs
            .data_elements
            .add(DataElement::new(id("SubB")).with_based_on(id("B")));
        specs
            .data_elements
            .add(DataElement::new(id("SubSubB")).with_based_on(id("SubB")));
        specs.data_elements.add(DataElement::new(id("NotSubB")));
        specs.data_elements.add(
            DataElement::new(id("Status"))
                .with_value(Value::identifiable(Identifier::primitive("concept")).with_min_max(1, Some(1))),
        );
        specs.data_elements.add(
            DataElement::new(id("Holder"))
                .with_value(Value::identifiable(id("B")).with_min_max(1, Some(1))),
        );
        specs.data_elements.add(
            DataElement::new(id("ChoiceHolder")).with_value(
                Value::choice(vec![
                    Value::identifiable(id("B")),
                    Value::identifiable(id("NotSubB")),
                ])
                .with_min_max(1, Some(1)),
            ),
        );
        specs.data_elements.add(
            DataElement::new(id("Flag"))
                .with_value(Value::identifiable(Identifier::primitive("boolean")).with_min_max(1, Some(1))),
        );
        specs
    }

    /// Expand `Sub` based on `Base`, where `Base` declares `base_field` and
    /// `Sub` redeclares it as `sub_field`
    fn expand_field(base_field: Value, sub_field: Value) -> (ExpansionOutcome, DataElement) {
        let mut specs = base_specs();
        specs
            .data_elements
            .add(DataElement::new(id("Base")).with_field(base_field));
        specs.data_elements.add(
            DataElement::new(id("Sub"))
                .with_based_on(id("Base"))
                .with_field(sub_field),
        );

        let outcome = Expander::default().expand(&specs);
        let sub = outcome
            .specifications
            .data_elements
            .find(&id("Sub"))
            .cloned()
            .unwrap();
        (outcome, sub)
    }

    #[test]
    fn type_narrowing_to_subtype_is_kept() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B")).with_min_max(0, Some(1)),
            Value::incomplete(id("B")).with_constraint(Constraint::type_(id("SubB"))),
        );

        assert_eq!(outcome.error_count(), 0);
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::type_(id("SubB"))]
        );
        assert_eq!(sub.fields[0].effective_identifier(), Some(&id("SubB")));
    }

    #[test]
    fn type_narrowing_to_unrelated_type_is_rejected() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B")).with_min_max(0, Some(1)),
            Value::incomplete(id("B")).with_constraint(Constraint::type_(id("NotSubB"))),
        );

        assert_eq!(outcome.error_count(), 1);
        let message = &outcome.issues[0].message;
        assert!(message.contains("shr.test.B"));
        assert!(message.contains("shr.test.NotSubB"));
        assert!(sub.fields[0].constraints_filter().type_().is_empty());
    }

    #[test]
    fn type_can_only_be_narrowed_further() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B"))
                .with_min_max(0, Some(1))
                .with_constraint(Constraint::type_(id("SubSubB"))),
            Value::incomplete(id("B")).with_constraint(Constraint::type_(id("SubB"))),
        );

        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].message.contains("Cannot further constrain type"));
        assert_eq!(sub.fields[0].effective_identifier(), Some(&id("SubSubB")));
    }

    #[test]
    fn type_on_value_is_rewritten_to_a_path_into_the_value() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Holder")).with_min_max(0, Some(1)),
            Value::incomplete(id("Holder"))
                .with_constraint(Constraint::type_(id("SubB")).with_on_value(true)),
        );

        assert_eq!(outcome.error_count(), 0, "{:?}", outcome.issues);
        let constraints = sub.fields[0].constraints();
        assert_eq!(constraints, &[Constraint::type_(id("SubB")).with_path(vec![id("B")])]);
        assert!(!constraints[0].on_value);
    }

    #[test]
    fn type_on_choice_value_is_checked_against_options() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("ChoiceHolder")).with_min_max(0, Some(1)),
            Value::incomplete(id("ChoiceHolder"))
                .with_constraint(Constraint::type_(id("SubB")).with_on_value(true)),
        );

        assert_eq!(outcome.error_count(), 0, "{:?}", outcome.issues);
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::type_(id("SubB")).with_on_value(true)]
        );

        let (outcome, sub) = expand_field(
            Value::identifiable(id("ChoiceHolder")).with_min_max(0, Some(1)),
            Value::incomplete(id("ChoiceHolder"))
                .with_constraint(Constraint::type_(id("Status")).with_on_value(true)),
        );

        assert_eq!(outcome.error_count(), 1);
        assert_eq!(
            outcome.issues[0].message,
            "shr.test.Sub: Cannot constrain type of value of shr.test.ChoiceHolder to shr.test.Status"
        );
        assert!(sub.fields[0].constraints().is_empty());
    }

    #[test]
    fn cardinality_constraints_supersede_when_narrower() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B"))
                .with_min_max(0, None)
                .with_constraint(Constraint::card(Cardinality::unbounded(1))),
            Value::incomplete(id("B")).with_constraint(Constraint::card(Cardinality::bounded(1, 2))),
        );

        assert_eq!(outcome.error_count(), 0);
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::card(Cardinality::bounded(1, 2))]
        );
    }

    #[test]
    fn cardinality_cannot_be_widened_against_previous_constraint() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B"))
                .with_min_max(0, None)
                .with_constraint(Constraint::card(Cardinality::bounded(1, 2))),
            Value::incomplete(id("B")).with_constraint(Constraint::card(Cardinality::bounded(0, 1))),
        );

        assert_eq!(outcome.error_count(), 1);
        let message = &outcome.issues[0].message;
        assert!(message.contains("Cannot further constrain cardinality"));
        assert!(message.contains("1..2"));
        assert_eq!(sub.fields[0].effective_card(), Some(Cardinality::bounded(1, 2)));
    }

    #[test]
    fn value_set_moves_to_value_of_coded_element() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Status")).with_min_max(0, Some(1)),
            Value::incomplete(id("Status")).with_constraint(Constraint::value_set(
                "http://example.org/vs/status",
                BindingStrength::Required,
            )),
        );

        assert_eq!(outcome.error_count(), 0);
        let constraint = &sub.fields[0].constraints()[0];
        assert!(constraint.on_value);
        assert!(matches!(constraint.kind, ConstraintKind::ValueSet { .. }));
    }

    #[test]
    fn value_set_on_non_code_is_rejected() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B")).with_min_max(0, Some(1)),
            Value::incomplete(id("B")).with_constraint(Constraint::value_set(
                "http://example.org/vs/status",
                BindingStrength::Required,
            )),
        );

        assert_eq!(outcome.error_count(), 1);
        assert!(sub.fields[0].constraints().is_empty());
    }

    #[test]
    fn value_set_conflicts_with_fixed_code() {
        let code = Concept::new("http://example.org/cs", "active");
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Status"))
                .with_min_max(0, Some(1))
                .with_constraint(Constraint::code(code.clone()).with_on_value(true)),
            Value::incomplete(id("Status")).with_constraint(Constraint::value_set(
                "http://example.org/vs/status",
                BindingStrength::Required,
            )),
        );

        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].message.contains("code"));
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::code(code).with_on_value(true)]
        );
    }

    #[test]
    fn newest_code_supersedes() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Status"))
                .with_min_max(0, Some(1))
                .with_constraint(Constraint::code(Concept::new("http://example.org/cs", "a"))),
            Value::incomplete(id("Status"))
                .with_constraint(Constraint::code(Concept::new("http://example.org/cs", "b"))),
        );

        assert_eq!(outcome.error_count(), 0);
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::code(Concept::new("http://example.org/cs", "b")).with_on_value(true)]
        );
    }

    #[test]
    fn includes_code_is_additive_without_duplicates() {
        let a = Concept::new("http://example.org/cs", "a");
        let b = Concept::new("http://example.org/cs", "b");
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Status"))
                .with_min_max(0, Some(1))
                .with_constraint(Constraint::includes_code(a.clone()).with_on_value(true)),
            Value::incomplete(id("Status"))
                .with_constraint(Constraint::includes_code(a))
                .with_constraint(Constraint::includes_code(b)),
        );

        assert_eq!(outcome.error_count(), 0);
        assert_eq!(sub.fields[0].constraints_filter().includes_code().len(), 2);
    }

    #[test]
    fn conflicting_booleans_are_rejected() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("Flag"))
                .with_min_max(0, Some(1))
                .with_constraint(Constraint::boolean(true)),
            Value::incomplete(id("Flag"))
                .with_constraint(Constraint::boolean(true))
                .with_constraint(Constraint::boolean(false)),
        );

        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].message.contains("already constrained to true"));
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::boolean(true).with_on_value(true)]
        );
    }

    #[test]
    fn includes_type_requires_a_list() {
        let (outcome, sub) = expand_field(
            Value::identifiable(id("B")).with_min_max(0, Some(1)),
            Value::incomplete(id("B"))
                .with_constraint(Constraint::includes_type(id("SubB"), Cardinality::bounded(0, 1))),
        );
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.issues[0].message.contains("is not a list"));
        assert!(sub.fields[0].constraints().is_empty());

        let (outcome, sub) = expand_field(
            Value::identifiable(id("B")).with_min_max(0, None),
            Value::incomplete(id("B"))
                .with_constraint(Constraint::includes_type(id("SubB"), Cardinality::bounded(0, 1)))
                .with_constraint(Constraint::includes_type(id("SubB"), Cardinality::bounded(1, 1))),
        );
        assert_eq!(outcome.error_count(), 0);
        assert_eq!(
            sub.fields[0].constraints(),
            &[Constraint::includes_type(id("SubB"), Cardinality::bounded(1, 1))]
        );
    }
}
