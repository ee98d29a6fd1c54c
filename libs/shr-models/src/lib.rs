//! SHR data models
//!
//! Strongly-typed value objects for the SHR modeling language: identifiers,
//! cardinalities, values, constraints, data elements, mappings, and the
//! `Specifications` container that groups them.
//!
//! # Module Organization
//!
//! - `common`: the models and the [`ConstraintsFilter`] query helper
//!
//! # Example
//!
//! ```rust
//! use shr_models::{Cardinality, Constraint, DataElement, Identifier, Value};
//!
//! let sub = DataElement::new(Identifier::new("shr.test", "SubA"))
//!     .with_based_on(Identifier::new("shr.test", "A"))
//!     .with_value(
//!         Value::identifiable(Identifier::primitive("string"))
//!             .with_min_max(0, Some(1))
//!             .with_constraint(Constraint::card(Cardinality::bounded(1, 1))),
//!     );
//!
//! let value = sub.value.as_ref().unwrap();
//! assert_eq!(value.effective_card(), Some(Cardinality::bounded(1, 1)));
//! assert_eq!(value.to_string(), "string");
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
