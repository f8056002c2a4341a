use crate::archive::Blueprint;
use crate::error::TransformError;
use crate::facade::{ApplicationContext, AttributeResolver};
use crate::resolve::find_child_by_plan_id_mut;
use crate::spec::EntitySpec;
use crate::topology::Topology;
use ahash::AHashMap;
use std::sync::Arc;
use tracing::info;

mod attributes;
mod factory;
mod modifier;
mod policy;

pub use attributes::AttributeBinder;
pub use factory::{APPLICATION_TYPE, FlatSpecFactory, NODE_TYPE_KEY, SpecFactory, TOPOLOGY_VERSION_KEY};
pub use modifier::{PropertiesModifier, SpecModifier};
pub use policy::PolicyDecorator;

/// Counts gathered over a finished spec tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub specs: usize,
    pub initializers: usize,
    pub decorations: usize,
}

impl TransformStats {
    fn collect(spec: &EntitySpec) -> Self {
        spec.children().iter().map(Self::collect).fold(
            Self {
                specs: 1,
                initializers: spec.initializers().len(),
                decorations: spec.decorations().len(),
            },
            |acc, child| Self {
                specs: acc.specs + child.specs,
                initializers: acc.initializers + child.initializers,
                decorations: acc.decorations + child.decorations,
            },
        )
    }
}

/// The finished spec tree of one topology instantiation.
#[derive(Debug, Clone)]
pub struct TransformedApplication {
    pub topology: String,
    pub version: String,
    pub root: EntitySpec,
    pub stats: TransformStats,
}

impl TransformedApplication {
    pub fn into_blueprint(self) -> Blueprint {
        Blueprint::new(self.topology, self.version, self.root)
    }
}

pub struct Transformer<'t> {
    topology: &'t Topology,
    factory: Box<dyn SpecFactory>,
    type_mappings: AHashMap<String, String>,
    modifiers: Vec<Box<dyn SpecModifier>>,
}

pub struct TransformerBuilder<'t> {
    topology: &'t Topology,
    factory: Box<dyn SpecFactory>,
    type_mappings: AHashMap<String, String>,
    modifiers: Vec<Box<dyn SpecModifier>>,
}

impl<'t> TransformerBuilder<'t> {
    pub fn new(topology: &'t Topology, resolver: Arc<dyn AttributeResolver>) -> Self {
        Self {
            topology,
            factory: Box::new(FlatSpecFactory),
            type_mappings: AHashMap::new(),
            modifiers: vec![
                Box::new(PropertiesModifier),
                Box::new(AttributeBinder::new(resolver)),
            ],
        }
    }

    /// Maps a topology node type onto the entity type its specs should use.
    pub fn with_type_mapping(mut self, node_type: &str, entity_type: &str) -> Self {
        self.type_mappings
            .insert(node_type.to_string(), entity_type.to_string());
        self
    }

    pub fn with_type_mappings<I, K, V>(mut self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.type_mappings
            .extend(mappings.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_factory(mut self, factory: Box<dyn SpecFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Appends a modifier, or replaces the registered one with the same name in place.
    pub fn with_modifier(mut self, modifier: Box<dyn SpecModifier>) -> Self {
        match self
            .modifiers
            .iter_mut()
            .find(|m| m.name() == modifier.name())
        {
            Some(slot) => *slot = modifier,
            None => self.modifiers.push(modifier),
        }
        self
    }

    pub fn build(self) -> Transformer<'t> {
        Transformer {
            topology: self.topology,
            factory: self.factory,
            type_mappings: self.type_mappings,
            modifiers: self.modifiers,
        }
    }
}

impl<'t> Transformer<'t> {
    pub fn builder(
        topology: &'t Topology,
        resolver: Arc<dyn AttributeResolver>,
    ) -> TransformerBuilder<'t> {
        TransformerBuilder::new(topology, resolver)
    }

    /// Produces the finished spec tree for the topology.
    ///
    /// Structural specs are built first, then every modifier runs once per
    /// node (attribute binding included), then policies are attached, since
    /// policies may target any node's spec. The first error aborts the whole
    /// transformation.
    pub fn transform(self) -> Result<TransformedApplication, TransformError> {
        let topology = self.topology;
        info!(
            topology = %topology.name,
            version = %topology.version,
            nodes = topology.nodes.len(),
            policies = topology.policies.len(),
            "transforming topology"
        );

        self.validate_relationships()?;
        let mut root = self.factory.build(topology, &self.type_mappings)?;

        let context = ApplicationContext::new(topology);
        for node in &topology.nodes {
            let spec = find_child_by_plan_id_mut(&mut root, &node.plan_id, "the transformer")?;
            for modifier in &self.modifiers {
                modifier.apply(spec, node, &context)?;
            }
        }

        let mut decorator = PolicyDecorator::new(&mut root);
        for policy in &topology.policies {
            decorator.decorate(policy)?;
        }

        let stats = TransformStats::collect(&root);
        info!(
            topology = %topology.name,
            specs = stats.specs,
            initializers = stats.initializers,
            decorations = stats.decorations,
            "transformation finished"
        );

        Ok(TransformedApplication {
            topology: topology.name.clone(),
            version: topology.version.clone(),
            root,
            stats,
        })
    }

    fn validate_relationships(&self) -> Result<(), TransformError> {
        for rel in &self.topology.relationships {
            for endpoint in [&rel.source, &rel.target] {
                if self.topology.node(endpoint).is_none() {
                    return Err(TransformError::NodeNotFound {
                        missing_node_id: endpoint.clone(),
                        source_node_id: rel.source.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
