use super::PolicyDefinition;
use crate::spec::Value;
use std::collections::BTreeMap;

/// The complete, canonical form of a parsed topology, ready for transformation.
/// This is the target structure for any custom document conversion.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub name: String,
    pub version: String,
    pub nodes: Vec<TopologyNode>,
    pub relationships: Vec<Relationship>,
    pub policies: Vec<PolicyDefinition>,
}

impl Topology {
    pub fn node(&self, plan_id: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.plan_id == plan_id)
    }
}

/// A named node template of the topology.
#[derive(Debug, Clone, Default)]
pub struct TopologyNode {
    /// Stable identifier, unique within one topology.
    pub plan_id: String,
    pub name: String,
    pub node_type: String,
    pub properties: BTreeMap<String, Value>,
    /// Declared attributes; values may be literals or intrinsic-function expressions.
    pub attributes: BTreeMap<String, Value>,
}

/// A directed relationship between two nodes (e.g. "hosted on", "connects to").
#[derive(Debug, Clone)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
}
