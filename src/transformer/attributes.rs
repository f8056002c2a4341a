use super::modifier::SpecModifier;
use crate::error::{AttributeResolutionError, TransformError};
use crate::facade::{ApplicationContext, AttributeResolver};
use crate::spec::{EntitySpec, Initializer};
use crate::topology::TopologyNode;
use std::sync::Arc;
use tracing::info;

/// Exposes the resolved attributes of a node as static attributes of its spec.
///
/// Values are computed once, by the injected resolver, and never re-evaluated
/// after attachment.
#[derive(Clone)]
pub struct AttributeBinder {
    resolver: Arc<dyn AttributeResolver>,
}

impl AttributeBinder {
    pub fn new(resolver: Arc<dyn AttributeResolver>) -> Self {
        Self { resolver }
    }

    /// Appends one static-attribute initializer per resolved attribute.
    ///
    /// Binding is additive: calling this twice for the same node appends the
    /// attributes twice. Resolver failures are returned as-is, and nothing is
    /// appended for the failing call.
    pub fn bind(
        &self,
        spec: &mut EntitySpec,
        node_id: &str,
        context: &ApplicationContext<'_>,
    ) -> Result<(), AttributeResolutionError> {
        info!(spec = %spec, "generating initializers for static attributes");
        let resolved = self.resolver.resolve_attributes(node_id, context)?;
        for (name, value) in resolved {
            spec.add_initializer(Initializer::static_attribute(name, value));
        }
        Ok(())
    }
}

impl SpecModifier for AttributeBinder {
    fn name(&self) -> &str {
        "attributes"
    }

    fn apply(
        &self,
        spec: &mut EntitySpec,
        node: &TopologyNode,
        context: &ApplicationContext<'_>,
    ) -> Result<(), TransformError> {
        Ok(self.bind(spec, &node.plan_id, context)?)
    }
}
