//! Loading model documents from disk

use crate::error::Result;
use shr_models::Specifications;
use std::fs;
use std::path::Path;

/// Parse a JSON specifications document
pub fn parse_specifications(json: &str) -> Result<Specifications> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    Ok(Specifications::from_value(&document)?)
}

/// Read and parse the specifications document at `path`
pub fn read_specifications(path: impl AsRef<Path>) -> Result<Specifications> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let specs = parse_specifications(&content)?;
    tracing::debug!(
        path = %path.display(),
        elements = specs.data_elements.len(),
        maps = specs.maps.len(),
        "loaded specifications"
    );
    Ok(specs)
}
