//! Specifications filter tests

mod test_support;

use shr_expand::{
    Expander, ExpanderConfig, FilterConfig, FilterStrategy, SpecificationsFilter,
};
use shr_models::{
    BindingStrength, CodeSystem, Concept, Constraint, DataElement, ElementMapping, Identifier,
    Namespace, Specifications, Value, ValueSet,
};

fn ident(fqn: &str) -> Identifier {
    fqn.parse().unwrap()
}

fn model() -> Specifications {
    let mut specs = Specifications::new();
    for ns in ["shr.core", "shr.obs", "shr.other"] {
        specs.namespaces.add(Namespace::new(ns));
    }

    specs.data_elements.add(DataElement::new(ident("shr.core.Entry")));
    specs.data_elements.add(DataElement::new(ident("shr.core.Unused")));
    specs.data_elements.add(
        DataElement::new(ident("shr.obs.Status"))
            .with_value(Value::identifiable(Identifier::primitive("code")).with_min_max(1, Some(1))),
    );
    specs.data_elements.add(
        DataElement::new(ident("shr.obs.Obs"))
            .with_based_on(ident("shr.core.Entry"))
            .with_field(
                Value::identifiable(ident("shr.obs.Status"))
                    .with_min_max(0, Some(1))
                    .with_constraint(Constraint::value_set(
                        "http://vs/status",
                        BindingStrength::Required,
                    )),
            ),
    );
    specs.data_elements.add(
        DataElement::new(ident("shr.other.Thing")).with_field(
            Value::identifiable(ident("shr.obs.Status"))
                .with_min_max(1, Some(1))
                .with_constraint(Constraint::code(Concept::new("http://cs/other", "x"))),
        ),
    );

    let mut status_vs = ValueSet::new(ident("shr.obs.StatusVS"), "http://vs/status");
    status_vs.concepts.push(Concept::new("http://cs/status", "final"));
    specs.value_sets.add(status_vs);
    specs
        .value_sets
        .add(ValueSet::new(ident("shr.core.UnusedVS"), "http://vs/unused"));
    specs
        .code_systems
        .add(CodeSystem::new(ident("shr.obs.StatusCS"), "http://cs/status"));
    specs
        .code_systems
        .add(CodeSystem::new(ident("shr.other.OtherCS"), "http://cs/other"));

    specs.maps.add(
        ElementMapping::new(ident("shr.obs.Obs"), "FHIR_STU_3").with_target_item("Observation"),
    );
    specs.maps.add(
        ElementMapping::new(ident("shr.other.Thing"), "FHIR_STU_3").with_target_item("Basic"),
    );
    specs
}

fn kept_elements(specs: &Specifications) -> Vec<String> {
    specs
        .data_elements
        .all()
        .map(|de| de.identifier.fqn())
        .collect()
}

fn filter(strategy: FilterStrategy, targets: &[&str]) -> SpecificationsFilter {
    SpecificationsFilter::new(FilterConfig::new(
        strategy,
        targets.iter().map(|t| t.to_string()).collect(),
    ))
}

#[test]
fn test_element_filter_keeps_dependencies() {
    let outcome = filter(FilterStrategy::Element, &["shr.obs.Obs"]).apply(&model());
    let specs = &outcome.specifications;

    assert!(outcome.unmatched.is_empty());
    assert_eq!(
        kept_elements(specs),
        vec!["shr.core.Entry", "shr.obs.Status", "shr.obs.Obs"]
    );
    assert!(specs.namespaces.find("shr.core").is_some());
    assert!(specs.namespaces.find("shr.obs").is_some());
    assert!(specs.namespaces.find("shr.other").is_none());
}

#[test]
fn test_element_filter_keeps_referenced_terminology() {
    let outcome = filter(FilterStrategy::Element, &["shr.obs.Obs"]).apply(&model());
    let specs = &outcome.specifications;

    assert_eq!(specs.value_sets.len(), 1);
    assert!(specs.value_sets.find_by_url("http://vs/status").is_some());
    assert_eq!(specs.code_systems.len(), 1);
    assert!(specs.code_systems.find_by_url("http://cs/status").is_some());
}

#[test]
fn test_element_filter_keeps_maps_of_kept_elements() {
    let outcome = filter(FilterStrategy::Element, &["shr.obs.Obs"]).apply(&model());
    let maps = &outcome.specifications.maps;

    assert_eq!(maps.len(), 1);
    assert!(maps.contains("FHIR_STU_3", &ident("shr.obs.Obs")));
}

#[test]
fn test_namespace_filter() {
    let outcome = filter(FilterStrategy::Namespace, &["shr.other"]).apply(&model());
    let specs = &outcome.specifications;

    assert_eq!(kept_elements(specs), vec!["shr.obs.Status", "shr.other.Thing"]);
    assert!(specs.value_sets.is_empty());
    assert!(specs.code_systems.find_by_url("http://cs/other").is_some());
    assert!(specs.code_systems.find_by_url("http://cs/status").is_none());
}

#[test]
fn test_hybrid_filter_accepts_elements_and_namespaces() {
    let outcome =
        filter(FilterStrategy::Hybrid, &["shr.core.Unused", "shr.other"]).apply(&model());

    assert!(outcome.unmatched.is_empty());
    assert_eq!(
        kept_elements(&outcome.specifications),
        vec!["shr.core.Unused", "shr.obs.Status", "shr.other.Thing"]
    );
}

#[test]
fn test_unmatched_targets_are_reported() {
    let outcome =
        filter(FilterStrategy::Element, &["shr.obs.Missing", "shr.core.Entry"]).apply(&model());

    assert_eq!(outcome.unmatched, vec!["shr.obs.Missing".to_string()]);
    assert_eq!(kept_elements(&outcome.specifications), vec!["shr.core.Entry"]);
}

#[test]
fn test_namespace_target_does_not_match_element_strategy() {
    let outcome = filter(FilterStrategy::Element, &["shr.other"]).apply(&model());

    assert_eq!(outcome.unmatched, vec!["shr.other".to_string()]);
    assert!(outcome.specifications.data_elements.is_empty());
}

#[test]
fn test_expander_applies_configured_filter() {
    let config = ExpanderConfig::builder()
        .filter(FilterStrategy::Element, vec!["shr.obs.Obs".into()])
        .build();
    let outcome = Expander::from_config(&config).unwrap().expand(&model());

    assert_eq!(outcome.error_count(), 0);
    let specs = &outcome.specifications;
    assert_eq!(specs.data_elements.len(), 3);
    let obs = specs.data_elements.find(&ident("shr.obs.Obs")).unwrap();
    assert_eq!(obs.hierarchy, vec![ident("shr.core.Entry")]);
    assert!(!specs.maps.contains("FHIR_STU_3", &ident("shr.other.Thing")));
}
