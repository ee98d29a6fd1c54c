//! Values: the typed content slots of data elements

use super::cardinality::Cardinality;
use super::constraint::{Constraint, ConstraintKind};
use super::constraint_filter::ConstraintsFilter;
use super::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value embedding (or, for choices, offering) a typed definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Value {
    Identifiable(IdentifiableValue),
    Ref(RefValue),
    Choice(ChoiceValue),
    Incomplete(IncompleteValue),
    Tbd(TbdValue),
}

/// Embeds the definition named by `identifier`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiableValue {
    pub identifier: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

/// References an entry by identity instead of embedding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefValue {
    pub identifier: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

/// One of several mutually exclusive options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub options: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

/// Placeholder for a constrained path whose definition comes from a base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteValue {
    pub identifier: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

/// Explicitly unfinished content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TbdValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Value {
    pub fn identifiable(identifier: Identifier) -> Self {
        Self::Identifiable(IdentifiableValue {
            identifier,
            card: None,
            constraints: Vec::new(),
        })
    }

    pub fn reference(identifier: Identifier) -> Self {
        Self::Ref(RefValue {
            identifier,
            card: None,
            constraints: Vec::new(),
        })
    }

    pub fn choice(options: Vec<Value>) -> Self {
        Self::Choice(ChoiceValue {
            options,
            card: None,
            constraints: Vec::new(),
        })
    }

    pub fn incomplete(identifier: Identifier) -> Self {
        Self::Incomplete(IncompleteValue {
            identifier,
            card: None,
            constraints: Vec::new(),
        })
    }

    pub fn tbd(text: Option<String>) -> Self {
        Self::Tbd(TbdValue {
            text,
            card: None,
            constraints: Vec::new(),
        })
    }

    pub fn with_card(mut self, card: Cardinality) -> Self {
        self.set_card(Some(card));
        self
    }

    pub fn with_min_max(self, min: u32, max: Option<u32>) -> Self {
        self.with_card(Cardinality::new(min, max))
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints_mut().push(constraint);
        self
    }

    /// Human readable name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Identifiable(_) => "value",
            Self::Ref(_) => "reference",
            Self::Choice(_) => "choice",
            Self::Incomplete(_) => "incomplete value",
            Self::Tbd(_) => "TBD",
        }
    }

    /// Check if both values are the same variant
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Identifiable(v) => Some(&v.identifier),
            Self::Ref(v) => Some(&v.identifier),
            Self::Incomplete(v) => Some(&v.identifier),
            Self::Choice(_) | Self::Tbd(_) => None,
        }
    }

    pub fn card(&self) -> Option<Cardinality> {
        match self {
            Self::Identifiable(v) => v.card,
            Self::Ref(v) => v.card,
            Self::Choice(v) => v.card,
            Self::Incomplete(v) => v.card,
            Self::Tbd(v) => v.card,
        }
    }

    pub fn set_card(&mut self, card: Option<Cardinality>) {
        match self {
            Self::Identifiable(v) => v.card = card,
            Self::Ref(v) => v.card = card,
            Self::Choice(v) => v.card = card,
            Self::Incomplete(v) => v.card = card,
            Self::Tbd(v) => v.card = card,
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        match self {
            Self::Identifiable(v) => &v.constraints,
            Self::Ref(v) => &v.constraints,
            Self::Choice(v) => &v.constraints,
            Self::Incomplete(v) => &v.constraints,
            Self::Tbd(v) => &v.constraints,
        }
    }

    pub fn constraints_mut(&mut self) -> &mut Vec<Constraint> {
        match self {
            Self::Identifiable(v) => &mut v.constraints,
            Self::Ref(v) => &mut v.constraints,
            Self::Choice(v) => &mut v.constraints,
            Self::Incomplete(v) => &mut v.constraints,
            Self::Tbd(v) => &mut v.constraints,
        }
    }

    pub fn constraints_filter(&self) -> ConstraintsFilter<'_> {
        ConstraintsFilter::new(self.constraints())
    }

    /// Identifier after applying the most recent own-path type constraint.
    ///
    /// For choices this is only defined when a type constraint narrows the
    /// choice to a single option.
    pub fn effective_identifier(&self) -> Option<&Identifier> {
        let own_types = self.constraints_filter().own().with_on_value(false).type_();
        match self {
            Self::Choice(_) if own_types.len() == 1 => own_types.last_type(),
            Self::Choice(_) | Self::Tbd(_) => None,
            _ => own_types.last_type().or_else(|| self.identifier()),
        }
    }

    /// Cardinality after applying the most recent own-path card constraint
    pub fn effective_card(&self) -> Option<Cardinality> {
        self.constraints_filter()
            .own()
            .with_on_value(false)
            .last_card()
            .or_else(|| self.card())
    }

    /// Check if `id` names this value, directly or through its effective type
    pub fn is_identified_by(&self, id: &Identifier) -> bool {
        self.identifier() == Some(id) || self.effective_identifier() == Some(id)
    }

    pub fn as_choice(&self) -> Option<&ChoiceValue> {
        match self {
            Self::Choice(choice) => Some(choice),
            _ => None,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Choice(_))
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete(_))
    }

    pub fn is_tbd(&self) -> bool {
        matches!(self, Self::Tbd(_))
    }
}

impl ChoiceValue {
    /// Options with nested choices flattened into a single list
    pub fn aggregate_options(&self) -> Vec<&Value> {
        let mut options = Vec::new();
        for option in &self.options {
            match option {
                Value::Choice(nested) => options.extend(nested.aggregate_options()),
                other => options.push(other),
            }
        }
        options
    }

    /// Find the (aggregate) option named by `id`
    pub fn find_option(&self, id: &Identifier) -> Option<&Value> {
        self.aggregate_options()
            .into_iter()
            .find(|option| option.is_identified_by(id))
    }

    pub fn has_option(&self, id: &Identifier) -> bool {
        self.find_option(id).is_some()
    }

    /// Check if an own-path type constraint pins this choice to one option
    pub fn is_pinned(&self) -> bool {
        ConstraintsFilter::new(&self.constraints)
            .own()
            .with_on_value(false)
            .type_()
            .has_any()
    }

    /// Narrow the choice to the option named by `id`.
    ///
    /// The option inherits the choice's cardinality when it declares none, and
    /// keeps the choice's constraints (other than own-path type constraints,
    /// which the selection replaces). When the choice offers more than one
    /// option and is not pinned by a type constraint, the selected option's
    /// minimum is 0: the other options could still have satisfied the choice.
    pub fn select_option(&self, id: &Identifier) -> Option<Value> {
        let mut selected = self.find_option(id)?.clone();

        if selected.card().is_none() {
            selected.set_card(self.card);
        }

        if self.aggregate_options().len() > 1 && !self.is_pinned() {
            if let Some(card) = selected.card() {
                selected.set_card(Some(Cardinality::new(0, card.max)));
            }
        }

        let carried = self
            .constraints
            .iter()
            .filter(|c| !(c.path.is_empty() && matches!(c.kind, ConstraintKind::Type { .. })))
            .cloned();
        selected.constraints_mut().extend(carried);

        Some(selected)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifiable(v) => write!(f, "{}", v.identifier),
            Self::Ref(v) => write!(f, "ref({})", v.identifier),
            Self::Incomplete(v) => write!(f, "{}", v.identifier),
            Self::Choice(v) => {
                let options = v
                    .options
                    .iter()
                    .map(|o| o.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ");
                write!(f, "({})", options)
            }
            Self::Tbd(v) => match &v.text {
                Some(text) => write!(f, "TBD \"{}\"", text),
                None => write!(f, "TBD"),
            },
        }
    }
}
