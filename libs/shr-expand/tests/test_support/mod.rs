#![allow(dead_code)]

use serde_json::{json, Value as Json};
use shr_expand::ExpansionOutcome;
use shr_models::{DataElement, Identifier, Specifications};

pub const NS: &str = "shr.test";

pub fn id(name: &str) -> Identifier {
    Identifier::new(NS, name)
}

/// JSON for an identifier in the test namespace
pub fn id_json(name: &str) -> Json {
    json!({ "namespace": NS, "name": name })
}

pub fn primitive_json(name: &str) -> Json {
    json!({ "namespace": "primitive", "name": name })
}

pub fn card_json(min: u32, max: Option<u32>) -> Json {
    match max {
        Some(max) => json!({ "min": min, "max": max }),
        None => json!({ "min": min }),
    }
}

/// Identifiable value JSON with a cardinality
pub fn value_json(identifier: Json, min: u32, max: Option<u32>) -> Json {
    json!({ "kind": "identifiable", "identifier": identifier, "card": card_json(min, max) })
}

/// Build a `Specifications` from a JSON document
pub fn specs_from_json(json: Json) -> Specifications {
    serde_json::from_value(json).expect("valid specifications fixture")
}

pub fn element<'a>(outcome: &'a ExpansionOutcome, name: &str) -> &'a DataElement {
    outcome
        .specifications
        .data_elements
        .find(&id(name))
        .unwrap_or_else(|| panic!("{} missing from expanded specifications", name))
}

pub fn messages(outcome: &ExpansionOutcome) -> Vec<String> {
    outcome.issues.iter().map(|i| i.message.clone()).collect()
}
