//! Model value objects shared by the expander and its consumers

pub mod cardinality;
pub mod constraint;
pub mod constraint_filter;
pub mod data_element;
pub mod error;
pub mod identifier;
pub mod mapping;
pub mod specifications;
pub mod value;
pub mod value_set;

// Re-export commonly used types
pub use cardinality::*;
pub use constraint::*;
pub use constraint_filter::*;
pub use data_element::*;
pub use error::{Error, Result};
pub use identifier::*;
pub use mapping::*;
pub use specifications::*;
pub use value::*;
pub use value_set::*;
