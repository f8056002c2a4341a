use crate::spec::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Reserved payload key holding the list of policy entries.
pub const POLICIES_KEY: &str = "policies";
/// Reserved key holding the policy type inside a payload entry.
pub const POLICY_TYPE_KEY: &str = "policyType";
/// Reserved key holding the policy properties inside a payload entry.
pub const POLICY_CONFIG_KEY: &str = "config";

/// The specs a policy applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PolicyTarget {
    /// The application root spec.
    #[default]
    Application,
    /// The children of the root carrying these plan ids.
    Members(BTreeSet<String>),
}

impl PolicyTarget {
    /// An empty member set means the policy targets the whole application.
    pub fn from_members<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: BTreeSet<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            PolicyTarget::Application
        } else {
            PolicyTarget::Members(members)
        }
    }
}

/// A policy of the topology, as handed to the policy decorator.
#[derive(Debug, Clone, Default)]
pub struct PolicyDefinition {
    pub name: String,
    pub policy_type: Option<String>,
    pub properties: BTreeMap<String, Value>,
    pub target: PolicyTarget,
}

impl PolicyDefinition {
    /// Builds the definition payload the deployment side understands:
    /// `{"policies": [{"policyType": <type>, "config": {..properties}}]}`.
    ///
    /// Returns `None` when the policy has no type.
    pub fn payload(&self) -> Option<Value> {
        let policy_type = self.policy_type.as_deref().filter(|t| !t.is_empty())?;
        let entry = BTreeMap::from([
            (POLICY_TYPE_KEY.to_string(), Value::from(policy_type)),
            (
                POLICY_CONFIG_KEY.to_string(),
                Value::Map(self.properties.clone()),
            ),
        ]);
        Some(Value::Map(BTreeMap::from([(
            POLICIES_KEY.to_string(),
            Value::List(vec![Value::Map(entry)]),
        )])))
    }
}
