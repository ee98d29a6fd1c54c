//! Query helper over constraint lists
//!
//! Every accessor returns a new filtered view; the underlying constraints are
//! never mutated. Path filtering is an exact match: a constraint at `[A, B]`
//! is not returned when asking for `[A]`.

use super::constraint::{Constraint, ConstraintKind, ConstraintTag};
use super::identifier::Identifier;

#[derive(Debug, Clone, Default)]
pub struct ConstraintsFilter<'a> {
    constraints: Vec<&'a Constraint>,
}

impl<'a> ConstraintsFilter<'a> {
    pub fn new(constraints: &'a [Constraint]) -> Self {
        Self {
            constraints: constraints.iter().collect(),
        }
    }

    fn retain(&self, keep: impl Fn(&Constraint) -> bool) -> Self {
        Self {
            constraints: self
                .constraints
                .iter()
                .copied()
                .filter(|c| keep(*c))
                .collect(),
        }
    }

    /// Constraints whose path equals `path`
    pub fn with_path(&self, path: &[Identifier]) -> Self {
        self.retain(|c| c.path.as_slice() == path)
    }

    /// Constraints on the owning value itself (empty path)
    pub fn own(&self) -> Self {
        self.with_path(&[])
    }

    pub fn with_on_value(&self, on_value: bool) -> Self {
        self.retain(|c| c.on_value == on_value)
    }

    /// Constraints addressing the same target as `constraint`
    pub fn same_target(&self, constraint: &Constraint) -> Self {
        self.retain(|c| c.same_target(constraint))
    }

    pub fn of_tag(&self, tag: ConstraintTag) -> Self {
        self.retain(|c| c.tag() == tag)
    }

    pub fn card(&self) -> Self {
        self.of_tag(ConstraintTag::Card)
    }

    pub fn type_(&self) -> Self {
        self.of_tag(ConstraintTag::Type)
    }

    pub fn value_set(&self) -> Self {
        self.of_tag(ConstraintTag::ValueSet)
    }

    pub fn code(&self) -> Self {
        self.of_tag(ConstraintTag::Code)
    }

    pub fn includes_code(&self) -> Self {
        self.of_tag(ConstraintTag::IncludesCode)
    }

    pub fn includes_type(&self) -> Self {
        self.of_tag(ConstraintTag::IncludesType)
    }

    pub fn boolean(&self) -> Self {
        self.of_tag(ConstraintTag::Boolean)
    }

    pub fn constraints(&self) -> &[&'a Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Constraint> + '_ {
        self.constraints.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn has_any(&self) -> bool {
        !self.is_empty()
    }

    /// Most recently declared constraint in the view
    pub fn last(&self) -> Option<&'a Constraint> {
        self.constraints.last().copied()
    }

    /// `is_a` of the most recent Type constraint in the view
    pub fn last_type(&self) -> Option<&'a Identifier> {
        self.type_().last().and_then(|c| match &c.kind {
            ConstraintKind::Type { is_a } => Some(is_a),
            _ => None,
        })
    }

    /// Cardinality of the most recent Card constraint in the view
    pub fn last_card(&self) -> Option<super::cardinality::Cardinality> {
        self.card().last().and_then(|c| match &c.kind {
            ConstraintKind::Card { card } => Some(*card),
            _ => None,
        })
    }
}
