//! SHR data element expansion
//!
//! Resolves the `basedOn` inheritance of a model's data elements, merges
//! inherited values and fields with local overrides, and consolidates their
//! constraints into a single consistent set per value. Target-system mappings
//! are expanded through the same hierarchy.
//!
//! Problems in the model never abort a run. They are collected as
//! [`ExpansionIssue`]s next to a best-effort expanded model.
//!
//! # Example
//!
//! ```rust
//! use shr_expand::{Expander, ExpanderConfig};
//! use shr_models::{DataElement, Identifier, Specifications, Value};
//!
//! let string = || Value::identifiable(Identifier::primitive("string"));
//! let mut specs = Specifications::new();
//! specs.data_elements.add(
//!     DataElement::new(Identifier::new("shr.test", "A")).with_value(string().with_min_max(0, Some(1))),
//! );
//! specs.data_elements.add(
//!     DataElement::new(Identifier::new("shr.test", "SubA"))
//!         .with_based_on(Identifier::new("shr.test", "A"))
//!         .with_value(string().with_min_max(1, Some(1))),
//! );
//!
//! let expander = Expander::from_config(&ExpanderConfig::default()).unwrap();
//! let outcome = expander.expand(&specs);
//! assert!(!outcome.has_errors());
//! ```

mod config;
mod consolidate;
mod error;
mod expander;
mod inheritance;
mod issue;
mod loader;
mod mapping;
mod merge;
mod path;
mod plan;
mod spec_filter;

pub use config::{
    ExpanderConfig, ExpanderConfigBuilder, FilterConfig, FilterStrategy, MappingConfig,
    PathResolution,
};
pub use error::{Error, Result};
pub use expander::Expander;
pub use inheritance::{is_subtype, recursive_based_ons};
pub use issue::{ExpansionIssue, ExpansionOutcome, IssueKind, IssueSeverity};
pub use loader::{parse_specifications, read_specifications};
pub use plan::{ExpansionPlan, MappingPlan};
pub use spec_filter::{FilterOutcome, SpecificationsFilter};

use shr_models::Specifications;

/// Expand `specs` with the default configuration
pub fn expand(specs: &Specifications) -> ExpansionOutcome {
    Expander::default().expand(specs)
}
