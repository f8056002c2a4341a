use super::Value;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Config key under which every spec records the plan id of its originating node.
pub const PLAN_ID: &str = "camp.plan.id";

/// A deferred configuration action, applied when the entity is instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Publishes `name` as a sensor holding a fixed, pre-computed value.
    StaticAttribute { name: String, value: Value },
}

impl Initializer {
    pub fn static_attribute(name: impl Into<String>, value: Value) -> Self {
        Initializer::StaticAttribute {
            name: name.into(),
            value,
        }
    }
}

/// A materialized policy, ready to be attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    /// Name of the topology policy this spec was produced from.
    pub name: String,
    pub policy_type: String,
    pub config: BTreeMap<String, Value>,
}

/// A behavior attached to a spec beyond its base entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decoration {
    Policy(PolicySpec),
}

impl Decoration {
    pub fn as_policy(&self) -> Option<&PolicySpec> {
        match self {
            Decoration::Policy(policy) => Some(policy),
        }
    }

    pub fn as_policy_mut(&mut self) -> Option<&mut PolicySpec> {
        match self {
            Decoration::Policy(policy) => Some(policy),
        }
    }
}

/// Blueprint for a runtime management entity, prior to instantiation.
///
/// Specs form a tree rooted at the application spec. Each child created from a
/// topology node carries that node's plan id under [`PLAN_ID`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntitySpec {
    entity_type: String,
    display_name: Option<String>,
    config: AHashMap<String, Value>,
    initializers: Vec<Initializer>,
    decorations: Vec<Decoration>,
    children: Vec<EntitySpec>,
}

impl EntitySpec {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    /// Creates a spec for a topology node, tagging it with the node's plan id.
    pub fn for_node(entity_type: impl Into<String>, plan_id: impl Into<String>) -> Self {
        let mut spec = Self::new(entity_type);
        spec.config
            .insert(PLAN_ID.to_string(), Value::String(plan_id.into()));
        spec
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn plan_id(&self) -> Option<&str> {
        self.config.get(PLAN_ID).and_then(Value::as_str)
    }

    pub fn config(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn config_entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.config.iter()
    }

    /// Sets a config value. The plan id is fixed at creation; attempts to
    /// overwrite an existing one are ignored.
    pub fn configure(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let key = key.into();
        if key == PLAN_ID {
            if let Some(existing) = self.plan_id() {
                warn!(
                    plan_id = existing,
                    attempted = %value,
                    "ignoring attempt to overwrite the plan id of a spec"
                );
                return self;
            }
        }
        self.config.insert(key, value);
        self
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    pub fn add_initializer(&mut self, initializer: Initializer) -> &mut Self {
        self.initializers.push(initializer);
        self
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn decorations_mut(&mut self) -> &mut [Decoration] {
        &mut self.decorations
    }

    pub fn add_decoration(&mut self, decoration: Decoration) -> &mut Self {
        self.decorations.push(decoration);
        self
    }

    /// Iterates over the policies attached to this spec, in attachment order.
    pub fn policies(&self) -> impl Iterator<Item = &PolicySpec> {
        self.decorations.iter().filter_map(Decoration::as_policy)
    }

    pub fn children(&self) -> &[EntitySpec] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [EntitySpec] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: EntitySpec) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Total number of specs in this tree, including `self`.
    pub fn tree_size(&self) -> usize {
        1 + self.children.iter().map(EntitySpec::tree_size).sum::<usize>()
    }

    /// Renders the tree as plain JSON, with config keys sorted.
    pub fn to_json(&self) -> serde_json::Value {
        let config: serde_json::Map<String, serde_json::Value> = self
            .config
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();

        let initializers: Vec<serde_json::Value> = self
            .initializers
            .iter()
            .map(|init| match init {
                Initializer::StaticAttribute { name, value } => serde_json::json!({
                    "type": "static-attribute",
                    "name": name,
                    "value": value.to_json(),
                }),
            })
            .collect();

        let decorations: Vec<serde_json::Value> = self
            .decorations
            .iter()
            .map(|decoration| match decoration {
                Decoration::Policy(policy) => serde_json::json!({
                    "type": "policy",
                    "name": policy.name,
                    "policyType": policy.policy_type,
                    "config": Value::Map(policy.config.clone()).to_json(),
                }),
            })
            .collect();

        let mut out = serde_json::json!({
            "type": self.entity_type,
            "config": config,
            "initializers": initializers,
            "decorations": decorations,
            "children": self.children.iter().map(EntitySpec::to_json).collect::<Vec<_>>(),
        });
        if let Some(name) = &self.display_name {
            out["name"] = serde_json::Value::String(name.clone());
        }
        out
    }
}

impl fmt::Display for EntitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntitySpec[{}", self.entity_type)?;
        if let Some(plan_id) = self.plan_id() {
            write!(f, ", planId={}", plan_id)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_id_is_fixed_at_creation() {
        let mut spec = EntitySpec::for_node("server", "n1");
        spec.configure(PLAN_ID, Value::from("other"));
        assert_eq!(spec.plan_id(), Some("n1"));
    }

    #[test]
    fn plan_id_can_be_set_on_untagged_spec() {
        let mut spec = EntitySpec::new("server");
        spec.configure(PLAN_ID, Value::from("late"));
        assert_eq!(spec.plan_id(), Some("late"));
    }

    #[test]
    fn tree_size_counts_all_descendants() {
        let mut grandchild_parent = EntitySpec::for_node("cluster", "c");
        grandchild_parent.add_child(EntitySpec::new("member"));
        let mut root = EntitySpec::new("application");
        root.add_child(grandchild_parent)
            .add_child(EntitySpec::for_node("db", "d"));
        assert_eq!(root.tree_size(), 4);
    }

    #[test]
    fn json_rendering_includes_initializers_and_policies() {
        let mut spec = EntitySpec::for_node("server", "n1").with_display_name("web");
        spec.add_initializer(Initializer::static_attribute("port", Value::Int(80)));
        spec.add_decoration(Decoration::Policy(PolicySpec {
            name: "scale".to_string(),
            policy_type: "autoscaler".to_string(),
            config: BTreeMap::from([("max".to_string(), Value::Int(5))]),
        }));

        let json = spec.to_json();
        assert_eq!(json["name"], "web");
        assert_eq!(json["config"][PLAN_ID], "n1");
        assert_eq!(json["initializers"][0]["name"], "port");
        assert_eq!(json["initializers"][0]["value"], 80);
        assert_eq!(json["decorations"][0]["policyType"], "autoscaler");
        assert_eq!(json["decorations"][0]["config"]["max"], 5);
    }
}
