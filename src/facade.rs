//! Collaborator interfaces the transformer consumes, and a reference attribute resolver.
//!
//! Everything here is injected explicitly: the [`Platform`](crate::platform::Platform)
//! and [`Transformer`](crate::transformer::Transformer) receive their collaborators
//! as constructor arguments rather than looking them up at runtime.

use crate::archive::ParsingResult;
use crate::error::AttributeResolutionError;
use crate::spec::Value;
use crate::topology::{Topology, TopologyNode};
use ahash::AHashMap;
use std::path::Path;

/// Attribute name -> resolved value for one node.
pub type ResolvedAttributeMap = AHashMap<String, Value>;

/// The application a node is being resolved within.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationContext<'a> {
    pub topology: &'a Topology,
}

impl<'a> ApplicationContext<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self { topology }
    }

    /// Finds a node by plan id, falling back to its display name.
    pub fn node(&self, reference: &str) -> Option<&'a TopologyNode> {
        self.topology
            .node(reference)
            .or_else(|| self.topology.nodes.iter().find(|n| n.name == reference))
    }
}

/// Computes the attributes of a node. Evaluation semantics are up to the implementor.
pub trait AttributeResolver: Send + Sync {
    fn resolve_attributes(
        &self,
        node_id: &str,
        context: &ApplicationContext<'_>,
    ) -> Result<ResolvedAttributeMap, AttributeResolutionError>;
}

impl<F> AttributeResolver for F
where
    F: Fn(&str, &ApplicationContext<'_>) -> Result<ResolvedAttributeMap, AttributeResolutionError>
        + Send
        + Sync,
{
    fn resolve_attributes(
        &self,
        node_id: &str,
        context: &ApplicationContext<'_>,
    ) -> Result<ResolvedAttributeMap, AttributeResolutionError> {
        self(node_id, context)
    }
}

/// Parses and registers a staged topology/type archive.
pub trait ArchiveService: Send + Sync {
    fn upload(&self, archive: &Path) -> ParsingResult;
}

/// Resolves a topology name to its current version.
pub trait TopologyLookup: Send + Sync {
    fn latest(&self, name: &str) -> Option<Topology>;
}

const MAX_REFERENCE_DEPTH: usize = 32;
const SELF_REFERENCE: &str = "SELF";

/// Resolves the attributes a node declares, evaluating the intrinsic functions
/// `get_property`, `get_attribute` and `concat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredAttributeResolver;

impl AttributeResolver for DeclaredAttributeResolver {
    fn resolve_attributes(
        &self,
        node_id: &str,
        context: &ApplicationContext<'_>,
    ) -> Result<ResolvedAttributeMap, AttributeResolutionError> {
        let node = context
            .topology
            .node(node_id)
            .ok_or_else(|| AttributeResolutionError::UnknownNode(node_id.to_string()))?;

        node.attributes
            .iter()
            .map(|(name, value)| {
                let evaluator = Evaluator {
                    context,
                    attribute: name,
                };
                evaluator
                    .resolve(node, value, 0)
                    .map(|resolved| (name.clone(), resolved))
            })
            .collect()
    }
}

struct Evaluator<'c, 'a> {
    context: &'c ApplicationContext<'a>,
    /// The top-level attribute being resolved, for cycle reporting.
    attribute: &'c str,
}

impl<'a> Evaluator<'_, 'a> {
    fn resolve(
        &self,
        node: &'a TopologyNode,
        value: &Value,
        depth: usize,
    ) -> Result<Value, AttributeResolutionError> {
        if depth > MAX_REFERENCE_DEPTH {
            return Err(AttributeResolutionError::CyclicReference {
                node_id: node.plan_id.clone(),
                attribute: self.attribute.to_string(),
            });
        }

        match function_call(value) {
            Some(("get_property", args)) => self.get_property(node, args, depth),
            Some(("get_attribute", args)) => self.get_attribute(node, args, depth),
            Some(("concat", args)) => self.concat(node, args, depth),
            _ => self.resolve_nested(node, value, depth),
        }
    }

    fn resolve_nested(
        &self,
        node: &'a TopologyNode,
        value: &Value,
        depth: usize,
    ) -> Result<Value, AttributeResolutionError> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| self.resolve(node, item, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| self.resolve(node, v, depth).map(|r| (k.clone(), r)))
                .collect::<Result<_, _>>()
                .map(Value::Map),
            literal => Ok(literal.clone()),
        }
    }

    fn get_property(
        &self,
        node: &'a TopologyNode,
        args: &Value,
        depth: usize,
    ) -> Result<Value, AttributeResolutionError> {
        let (target, path) = self.reference_args(node, "get_property", args)?;
        let (property, nested) = path.split_first().ok_or_else(|| {
            invalid(node, "get_property", "expected [<node>, <property>, ..]")
        })?;
        let value = target.properties.get(*property).ok_or_else(|| {
            AttributeResolutionError::UnknownProperty {
                node_id: target.plan_id.clone(),
                property: property.to_string(),
            }
        })?;
        let value = descend(target, property, value, nested)?;
        self.resolve(target, value, depth + 1)
    }

    fn get_attribute(
        &self,
        node: &'a TopologyNode,
        args: &Value,
        depth: usize,
    ) -> Result<Value, AttributeResolutionError> {
        let (target, path) = self.reference_args(node, "get_attribute", args)?;
        let [attribute] = path.as_slice() else {
            return Err(invalid(
                node,
                "get_attribute",
                "expected [<node>, <attribute>]",
            ));
        };
        let value = target.attributes.get(*attribute).ok_or_else(|| {
            AttributeResolutionError::UnknownAttribute {
                node_id: target.plan_id.clone(),
                attribute: attribute.to_string(),
            }
        })?;
        self.resolve(target, value, depth + 1)
    }

    fn concat(
        &self,
        node: &'a TopologyNode,
        args: &Value,
        depth: usize,
    ) -> Result<Value, AttributeResolutionError> {
        let parts = args
            .as_list()
            .ok_or_else(|| invalid(node, "concat", "expected a list of parts"))?;
        let mut out = String::new();
        for part in parts {
            match self.resolve(node, part, depth + 1)? {
                Value::String(s) => out.push_str(&s),
                Value::Null => {}
                other => out.push_str(&other.to_string()),
            }
        }
        Ok(Value::String(out))
    }

    /// Splits `[<node>, <key>, ..]` into the referenced node and the remaining keys.
    fn reference_args<'v>(
        &self,
        node: &'a TopologyNode,
        function: &str,
        args: &'v Value,
    ) -> Result<(&'a TopologyNode, Vec<&'v str>), AttributeResolutionError> {
        let items = args
            .as_list()
            .ok_or_else(|| invalid(node, function, "arguments must be a list"))?;
        let keys = items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| invalid(node, function, "arguments must be strings"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (entity, rest) = keys
            .split_first()
            .ok_or_else(|| invalid(node, function, "missing entity reference"))?;

        let target = if *entity == SELF_REFERENCE {
            node
        } else {
            self.context
                .node(entity)
                .ok_or_else(|| AttributeResolutionError::UnknownNode(entity.to_string()))?
        };
        Ok((target, rest.to_vec()))
    }
}

/// A single-entry map is read as `{<function>: <args>}`.
fn function_call(value: &Value) -> Option<(&str, &Value)> {
    match value.as_map() {
        Some(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

fn descend<'v>(
    node: &TopologyNode,
    property: &str,
    mut value: &'v Value,
    nested: &[&str],
) -> Result<&'v Value, AttributeResolutionError> {
    for key in nested {
        value = value
            .as_map()
            .and_then(|map| map.get(*key))
            .ok_or_else(|| AttributeResolutionError::UnknownProperty {
                node_id: node.plan_id.clone(),
                property: format!("{}.{}", property, key),
            })?;
    }
    Ok(value)
}

fn invalid(node: &TopologyNode, function: &str, message: &str) -> AttributeResolutionError {
    AttributeResolutionError::InvalidExpression {
        node_id: node.plan_id.clone(),
        function: function.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn node(plan_id: &str, properties: serde_json::Value, attributes: serde_json::Value) -> TopologyNode {
        let to_map = |v: serde_json::Value| -> BTreeMap<String, Value> {
            match Value::from(v) {
                Value::Map(map) => map,
                _ => BTreeMap::new(),
            }
        };
        TopologyNode {
            plan_id: plan_id.to_string(),
            name: format!("{}-name", plan_id),
            node_type: "tosca.nodes.Root".to_string(),
            properties: to_map(properties),
            attributes: to_map(attributes),
        }
    }

    fn topology() -> Topology {
        Topology {
            name: "shop".to_string(),
            version: "1.0.0".to_string(),
            nodes: vec![
                node(
                    "n1",
                    json!({"port": 8080, "tls": {"enabled": true}}),
                    json!({
                        "listen_port": {"get_property": ["SELF", "port"]},
                        "tls": {"get_property": ["SELF", "tls", "enabled"]},
                        "db_url": {"concat": ["jdbc://", {"get_attribute": ["n2", "host"]}, ":", {"get_property": ["n2-name", "port"]}]},
                        "static": "fixed",
                    }),
                ),
                node("n2", json!({"port": 5432}), json!({"host": "db.local"})),
                node("loop", json!({}), json!({"a": {"get_attribute": ["SELF", "a"]}})),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn resolves_literals_and_functions() {
        let topology = topology();
        let ctx = ApplicationContext::new(&topology);
        let resolved = DeclaredAttributeResolver
            .resolve_attributes("n1", &ctx)
            .expect("attributes resolve");

        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved["listen_port"], Value::Int(8080));
        assert_eq!(resolved["tls"], Value::Bool(true));
        assert_eq!(resolved["db_url"], Value::from("jdbc://db.local:5432"));
        assert_eq!(resolved["static"], Value::from("fixed"));
    }

    #[test]
    fn unknown_node_fails() {
        let topology = topology();
        let ctx = ApplicationContext::new(&topology);
        assert_eq!(
            DeclaredAttributeResolver.resolve_attributes("nope", &ctx),
            Err(AttributeResolutionError::UnknownNode("nope".to_string()))
        );
    }

    #[test]
    fn unknown_property_fails() {
        let mut topology = topology();
        topology.nodes[1]
            .attributes
            .insert("bad".to_string(), Value::from(json!({"get_property": ["SELF", "missing"]})));
        let ctx = ApplicationContext::new(&topology);
        assert!(matches!(
            DeclaredAttributeResolver.resolve_attributes("n2", &ctx),
            Err(AttributeResolutionError::UnknownProperty { property, .. }) if property == "missing"
        ));
    }

    #[test]
    fn self_reference_is_reported_as_cycle() {
        let topology = topology();
        let ctx = ApplicationContext::new(&topology);
        assert!(matches!(
            DeclaredAttributeResolver.resolve_attributes("loop", &ctx),
            Err(AttributeResolutionError::CyclicReference { attribute, .. }) if attribute == "a"
        ));
    }

    #[test]
    fn closures_act_as_resolvers() {
        let resolver = |node_id: &str, _: &ApplicationContext<'_>| {
            Ok::<_, AttributeResolutionError>(ResolvedAttributeMap::from_iter([(
                "id".to_string(),
                Value::from(node_id),
            )]))
        };
        let topology = topology();
        let resolved = resolver
            .resolve_attributes("n2", &ApplicationContext::new(&topology))
            .unwrap();
        assert_eq!(resolved["id"], Value::from("n2"));
    }
}
