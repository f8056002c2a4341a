use super::{IntoTopology, PolicyDefinition, PolicyTarget, Relationship, Topology, TopologyNode};
use crate::error::ConversionError;
use crate::spec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the JSON topology document format. They serialize back to the same shape.

/// A topology as written in a JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub relationships: Vec<DocumentRelationship>,
    #[serde(default)]
    pub policies: Vec<DocumentPolicy>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type", alias = "nodeType")]
    pub node_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentRelationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", alias = "relationshipType")]
    pub relationship_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentPolicy {
    pub name: String,
    #[serde(default, rename = "type", alias = "policyType")]
    pub policy_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default, alias = "members")]
    pub targets: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl TopologyDocument {
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::Parse(e.to_string()))
    }
}

fn convert_map(map: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

impl IntoTopology for TopologyDocument {
    fn into_topology(self) -> Result<Topology, ConversionError> {
        if self.name.trim().is_empty() {
            return Err(ConversionError::Validation(
                "topology name must not be empty".to_string(),
            ));
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                if node.id.trim().is_empty() {
                    return Err(ConversionError::Validation(format!(
                        "node of type '{}' has an empty id",
                        node.node_type
                    )));
                }
                Ok(TopologyNode {
                    name: node.name.unwrap_or_else(|| node.id.clone()),
                    plan_id: node.id,
                    node_type: node.node_type,
                    properties: convert_map(node.properties),
                    attributes: convert_map(node.attributes),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let relationships = self
            .relationships
            .into_iter()
            .map(|rel| Relationship {
                source: rel.source,
                target: rel.target,
                relationship_type: rel.relationship_type,
            })
            .collect();

        let policies = self
            .policies
            .into_iter()
            .map(|policy| PolicyDefinition {
                name: policy.name,
                policy_type: policy.policy_type,
                properties: convert_map(policy.properties),
                target: PolicyTarget::from_members(policy.targets),
            })
            .collect();

        Ok(Topology {
            name: self.name,
            version: self.version,
            nodes,
            relationships,
            policies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "name": "shop",
        "nodes": [
            {"id": "n1", "name": "web", "type": "tosca.nodes.WebServer",
             "properties": {"port": 8080}},
            {"id": "n2", "nodeType": "tosca.nodes.Database"}
        ],
        "relationships": [{"source": "n1", "target": "n2", "type": "ConnectsTo"}],
        "policies": [
            {"name": "ha", "type": "ha.policy", "properties": {"threshold": 3}, "targets": ["n1"]},
            {"name": "audit", "policyType": "audit.policy"}
        ]
    }"#;

    #[test]
    fn converts_document_into_topology() {
        let topology = TopologyDocument::from_json(DOCUMENT)
            .and_then(IntoTopology::into_topology)
            .expect("document converts");

        assert_eq!(topology.name, "shop");
        assert_eq!(topology.version, "1.0.0");
        assert_eq!(topology.nodes.len(), 2);
        assert_eq!(topology.nodes[1].name, "n2");
        assert_eq!(topology.nodes[0].properties["port"], Value::Int(8080));
        assert_eq!(topology.relationships[0].relationship_type, "ConnectsTo");
        assert_eq!(
            topology.policies[0].target,
            PolicyTarget::from_members(["n1"])
        );
        assert_eq!(topology.policies[1].target, PolicyTarget::Application);
        assert_eq!(
            topology.policies[1].policy_type.as_deref(),
            Some("audit.policy")
        );
    }

    #[test]
    fn rejects_nodes_without_id() {
        let json = r#"{"name": "t", "nodes": [{"id": " ", "type": "x"}]}"#;
        let result = TopologyDocument::from_json(json).and_then(IntoTopology::into_topology);
        assert!(matches!(result, Err(ConversionError::Validation(_))));
    }

    #[test]
    fn reports_malformed_json() {
        assert!(matches!(
            TopologyDocument::from_json("{not json"),
            Err(ConversionError::Parse(_))
        ));
    }
}
