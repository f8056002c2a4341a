//! Unit tests for core topospec functionality.
mod common;
use std::collections::BTreeMap;
use topospec::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Int(42)), "42");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::from("x")), "\"x\"");
}

#[test]
fn test_entity_spec_display() {
    let spec = EntitySpec::for_node("server", "n1");
    assert!(spec.to_string().contains("server"));
    assert!(spec.to_string().contains("n1"));
}

#[test]
fn test_policy_payload_shape() {
    let policy = PolicyDefinition {
        name: "ha".to_string(),
        policy_type: Some("ha.policy".to_string()),
        properties: BTreeMap::from([("threshold".to_string(), Value::Int(3))]),
        target: PolicyTarget::Application,
    };
    let payload = policy.payload().unwrap().to_json();
    assert_eq!(
        payload,
        serde_json::json!({
            "policies": [{ "policyType": "ha.policy", "config": { "threshold": 3 } }]
        })
    );
}

#[test]
fn test_config_predicate_matches_plan_id() {
    let spec = EntitySpec::for_node("server", "n1");
    let expected = Value::from("n1");
    let predicate = config_equals(PLAN_ID, &expected);
    assert!(predicate.matches(&spec));
    assert_eq!(predicate.to_string(), "config_equals(camp.plan.id, \"n1\")");
}

#[test]
fn test_error_display() {
    let err = TransformError::TargetNotFound {
        missing: vec!["n3".to_string(), "n4".to_string()],
        requested_by: "policy 'ha'".to_string(),
    };
    assert!(err.to_string().contains("'n3', 'n4'"));
    assert!(err.to_string().contains("policy 'ha'"));

    let err = TransformError::NodeNotFound {
        missing_node_id: "node_B".to_string(),
        source_node_id: "node_A".to_string(),
    };
    assert!(err.to_string().contains("node_B"));
    assert!(err.to_string().contains("node_A"));

    let err = TransformError::MissingPolicyType {
        policy: "ha".to_string(),
    };
    assert_eq!(err.to_string(), "Type was not found for policy 'ha'");

    let err: TransformError = AttributeResolutionError::UnknownNode("n9".to_string()).into();
    assert_eq!(err.to_string(), "Node 'n9' is not part of the topology");
}

#[test]
fn test_parse_diagnostic_display() {
    let diagnostic = ParseDiagnostic::new(ParseLevel::Warning, "no nodes").in_file("a.json");
    assert_eq!(diagnostic.to_string(), "[WARNING] a.json: no nodes");
}
