use super::definition::Topology;
use crate::error::ConversionError;

/// A trait for custom topology formats that can be converted into a `Topology`.
///
/// The transformer never parses documents itself. Implement this trait on the
/// structs your parser produces to hand them over in canonical form.
///
/// # Example
///
/// ```rust,no_run
/// use topospec::prelude::*;
/// use topospec::error::ConversionError;
///
/// struct MyNode { key: String, kind: String }
/// struct MyPlan { nodes: Vec<MyNode> }
///
/// impl IntoTopology for MyPlan {
///     fn into_topology(self) -> std::result::Result<Topology, ConversionError> {
///         let nodes = self
///             .nodes
///             .into_iter()
///             .map(|n| TopologyNode {
///                 name: n.key.clone(),
///                 plan_id: n.key,
///                 node_type: n.kind,
///                 ..Default::default()
///             })
///             .collect();
///         Ok(Topology { name: "my-plan".to_string(), nodes, ..Default::default() })
///     }
/// }
/// ```
pub trait IntoTopology {
    /// Consumes the object and converts it into a canonical topology.
    fn into_topology(self) -> Result<Topology, ConversionError>;
}

impl IntoTopology for Topology {
    fn into_topology(self) -> Result<Topology, ConversionError> {
        Ok(self)
    }
}
