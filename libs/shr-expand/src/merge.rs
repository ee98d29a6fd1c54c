//! Overriding an inherited value with a redeclaration

use crate::expander::ExpansionRun;
use crate::issue::IssueKind;
use shr_models::{Constraint, Identifier, Value};

impl<'a> ExpansionRun<'a> {
    /// Merge `new` (declared by `element`) over the inherited `old`.
    ///
    /// Returns `None` when the override is incompatible; the problem is
    /// recorded and the caller decides what survives.
    pub(crate) fn merge_value(
        &mut self,
        element: &Identifier,
        old: &Value,
        new: &Value,
    ) -> Option<Value> {
        if !old.same_kind(new) && !new.is_incomplete() && !old.is_choice() {
            self.error(
                element,
                IssueKind::Merge,
                format!("{}: Cannot override {} with {}", element, describe(old), describe(new)),
            );
            return None;
        }

        if old.is_tbd() && new.is_tbd() {
            return Some(new.clone());
        }

        if new.is_choice() {
            self.error(
                element,
                IssueKind::Merge,
                format!(
                    "{}: Cannot override {} with {}: overriding with a choice value is not supported",
                    element,
                    describe(old),
                    describe(new)
                ),
            );
            return None;
        }

        let Some(new_id) = new.identifier() else {
            self.error(
                element,
                IssueKind::Merge,
                format!("{}: Cannot override {} with {}", element, describe(old), describe(new)),
            );
            return None;
        };

        let mut merged = match old {
            Value::Choice(choice) => match choice.select_option(new_id) {
                Some(option) if new.is_incomplete() || option.same_kind(new) => option,
                _ => {
                    self.error(
                        element,
                        IssueKind::Merge,
                        format!(
                            "{}: Cannot override {} with {}: no matching option",
                            element,
                            describe(old),
                            describe(new)
                        ),
                    );
                    return None;
                }
            },
            _ if old.is_identified_by(new_id) => old.clone(),
            _ => {
                self.error(
                    element,
                    IssueKind::Merge,
                    format!("{}: Cannot override {} with {}", element, describe(old), describe(new)),
                );
                return None;
            }
        };

        if let (Some(old_card), Some(new_card)) = (merged.card(), new.card()) {
            if old_card != new_card {
                merged.constraints_mut().push(Constraint::card(new_card));
            }
        }

        merged
            .constraints_mut()
            .extend(new.constraints().iter().cloned());

        Some(self.consolidate_constraints(element, merged))
    }
}

/// Value rendering for diagnostics, with its cardinality when known
fn describe(value: &Value) -> String {
    match value.effective_card() {
        Some(card) => format!("{} {}", value, card),
        None => value.to_string(),
    }
}
