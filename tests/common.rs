//! Common test utilities for building topologies and resolvers.
use std::collections::BTreeMap;
use std::sync::Arc;
use topospec::prelude::*;

/// Builds a node with no properties or attributes.
#[allow(dead_code)]
pub fn node(plan_id: &str, name: &str, node_type: &str) -> TopologyNode {
    TopologyNode {
        plan_id: plan_id.to_string(),
        name: name.to_string(),
        node_type: node_type.to_string(),
        ..Default::default()
    }
}

/// Builds a typed policy with a single `threshold` property.
#[allow(dead_code)]
pub fn threshold_policy(name: &str, policy_type: &str, threshold: i64, members: &[&str]) -> PolicyDefinition {
    PolicyDefinition {
        name: name.to_string(),
        policy_type: Some(policy_type.to_string()),
        properties: BTreeMap::from([("threshold".to_string(), Value::Int(threshold))]),
        target: PolicyTarget::from_members(members.iter().copied()),
    }
}

/// Creates the two-node application used by most scenarios.
///
/// `web` (n1) listens on port 8080 and exposes a computed `url` attribute;
/// `db` (n2) is referenced by `web` through a `connectsTo` relationship.
#[allow(dead_code)]
pub fn create_two_node_topology() -> Topology {
    let mut web = node("n1", "web", "tosca.nodes.WebServer");
    web.properties
        .insert("port".to_string(), Value::Int(8080));
    web.attributes.insert(
        "url".to_string(),
        Value::from(serde_json::json!({
            "concat": ["http://", { "get_property": ["SELF", "host"] }, ":", { "get_property": ["SELF", "port"] }]
        })),
    );
    web.properties
        .insert("host".to_string(), Value::from("web.local"));

    let mut db = node("n2", "db", "tosca.nodes.Database");
    db.attributes
        .insert("dsn".to_string(), Value::from("postgres://db"));

    Topology {
        name: "shop".to_string(),
        version: "1.0.0".to_string(),
        nodes: vec![web, db],
        relationships: vec![Relationship {
            source: "n1".to_string(),
            target: "n2".to_string(),
            relationship_type: "tosca.relationships.ConnectsTo".to_string(),
        }],
        policies: vec![],
    }
}

/// A resolver returning fixed attributes `ip` and `port` for every node.
#[allow(dead_code)]
pub fn fixed_resolver() -> Arc<dyn AttributeResolver> {
    Arc::new(|_node_id: &str, _ctx: &ApplicationContext<'_>| {
        Ok::<_, AttributeResolutionError>(ResolvedAttributeMap::from_iter([
            ("ip".to_string(), Value::from("10.0.0.1")),
            ("port".to_string(), Value::Int(80)),
        ]))
    })
}

/// The same topology as [`create_two_node_topology`] written as a JSON document.
#[allow(dead_code)]
pub const TWO_NODE_TOPOLOGY_JSON: &str = r#"{
    "name": "shop",
    "version": "1.0.0",
    "nodes": [
        {
            "id": "n1",
            "name": "web",
            "type": "tosca.nodes.WebServer",
            "properties": { "port": 8080, "host": "web.local" },
            "attributes": {
                "url": { "concat": ["http://", { "get_property": ["SELF", "host"] }, ":", { "get_property": ["SELF", "port"] }] }
            }
        },
        {
            "id": "n2",
            "name": "db",
            "type": "tosca.nodes.Database",
            "attributes": { "dsn": "postgres://db" }
        }
    ],
    "relationships": [
        { "source": "n1", "target": "n2", "type": "tosca.relationships.ConnectsTo" }
    ],
    "policies": [
        { "name": "ha", "type": "ha.policy", "properties": { "threshold": 3 }, "targets": ["n1"] }
    ]
}"#;
