use crate::error::TransformError;
use crate::spec::{EntitySpec, Value};
use crate::topology::Topology;
use ahash::{AHashMap, AHashSet};

/// Entity type of the root spec produced by [`FlatSpecFactory`].
pub const APPLICATION_TYPE: &str = "application";
/// Config key recording the topology node type a spec was built from.
pub const NODE_TYPE_KEY: &str = "tosca.node.type";
/// Config key recording the topology version on the application spec.
pub const TOPOLOGY_VERSION_KEY: &str = "tosca.topology.version";

/// Builds the structural spec tree for a topology: one spec per node.
pub trait SpecFactory: Send + Sync {
    fn build(
        &self,
        topology: &Topology,
        type_mappings: &AHashMap<String, String>,
    ) -> Result<EntitySpec, TransformError>;
}

/// Places one child spec per node directly under the application spec.
///
/// Node types are translated through the type mappings; unmapped types are kept as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSpecFactory;

impl SpecFactory for FlatSpecFactory {
    fn build(
        &self,
        topology: &Topology,
        type_mappings: &AHashMap<String, String>,
    ) -> Result<EntitySpec, TransformError> {
        let mut root = EntitySpec::new(APPLICATION_TYPE).with_display_name(topology.name.clone());
        root.configure(TOPOLOGY_VERSION_KEY, Value::from(topology.version.clone()));

        let mut seen = AHashSet::new();
        for node in &topology.nodes {
            if !seen.insert(node.plan_id.as_str()) {
                return Err(TransformError::DuplicatePlanId(node.plan_id.clone()));
            }
            let entity_type = type_mappings
                .get(&node.node_type)
                .map(String::as_str)
                .unwrap_or(&node.node_type);

            let mut child = EntitySpec::for_node(entity_type, node.plan_id.clone())
                .with_display_name(node.name.clone());
            child.configure(NODE_TYPE_KEY, Value::from(node.node_type.clone()));
            root.add_child(child);
        }
        Ok(root)
    }
}
