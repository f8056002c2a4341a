use crate::error::TransformError;
use crate::facade::ApplicationContext;
use crate::spec::EntitySpec;
use crate::topology::TopologyNode;

/// Defines the contract for a pass that enriches the spec built for one node.
pub trait SpecModifier: Send + Sync {
    /// Registry key; registering a modifier with an existing name replaces it.
    fn name(&self) -> &str;
    fn apply(
        &self,
        spec: &mut EntitySpec,
        node: &TopologyNode,
        context: &ApplicationContext<'_>,
    ) -> Result<(), TransformError>;
}

/// Copies every declared node property into the spec's config.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesModifier;

impl SpecModifier for PropertiesModifier {
    fn name(&self) -> &str {
        "properties"
    }

    fn apply(
        &self,
        spec: &mut EntitySpec,
        node: &TopologyNode,
        _context: &ApplicationContext<'_>,
    ) -> Result<(), TransformError> {
        for (key, value) in &node.properties {
            spec.configure(key.clone(), value.clone());
        }
        Ok(())
    }
}
