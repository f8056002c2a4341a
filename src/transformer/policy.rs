use crate::error::TransformError;
use crate::resolve::child_index_by_plan_id;
use crate::spec::{Decoration, EntitySpec, PolicySpec, Value};
use crate::topology::{
    POLICIES_KEY, POLICY_CONFIG_KEY, POLICY_TYPE_KEY, PolicyDefinition, PolicyTarget,
};
use tracing::debug;

/// Attaches topology policies to the specs of an application tree.
pub struct PolicyDecorator<'a> {
    root: &'a mut EntitySpec,
}

impl<'a> PolicyDecorator<'a> {
    pub fn new(root: &'a mut EntitySpec) -> Self {
        Self { root }
    }

    /// Applies `policy` to the application root or to each of its member specs.
    ///
    /// Either every target is decorated or none is: the type is checked and all
    /// members are resolved before the tree is touched. A missing type yields
    /// `MissingPolicyType`; unknown members are reported together in one
    /// `TargetNotFound`.
    pub fn decorate(&mut self, policy: &PolicyDefinition) -> Result<(), TransformError> {
        let payload = policy
            .payload()
            .ok_or_else(|| TransformError::MissingPolicyType {
                policy: policy.name.clone(),
            })?;
        let policy_specs = resolve_payload(&policy.name, &payload)?;

        match &policy.target {
            PolicyTarget::Members(members) if members.is_empty() => {
                debug!(policy = %policy.name, "empty member set, decorating application spec");
                attach(self.root, &policy_specs);
            }
            PolicyTarget::Application => {
                debug!(policy = %policy.name, "decorating application spec");
                attach(self.root, &policy_specs);
            }
            PolicyTarget::Members(members) => {
                let requested_by = format!("policy '{}'", policy.name);
                let mut indices = Vec::with_capacity(members.len());
                let mut missing = Vec::new();
                for plan_id in members {
                    match child_index_by_plan_id(self.root, plan_id, &requested_by) {
                        Ok(index) => indices.push(index),
                        Err(_) => missing.push(plan_id.clone()),
                    }
                }
                if !missing.is_empty() {
                    return Err(TransformError::TargetNotFound {
                        missing,
                        requested_by,
                    });
                }

                for index in indices {
                    let spec = &mut self.root.children_mut()[index];
                    debug!(policy = %policy.name, spec = %spec, "decorating member spec");
                    attach(spec, &policy_specs);
                }
            }
        }
        Ok(())
    }
}

/// Each spec receives its own copies.
fn attach(spec: &mut EntitySpec, policy_specs: &[PolicySpec]) {
    for policy_spec in policy_specs {
        spec.add_decoration(Decoration::Policy(policy_spec.clone()));
    }
}

/// Reads every entry of a `{"policies": [..]}` payload into a `PolicySpec`.
fn resolve_payload(policy_name: &str, payload: &Value) -> Result<Vec<PolicySpec>, TransformError> {
    let malformed = |message: &str| TransformError::MalformedPolicyPayload {
        policy: policy_name.to_string(),
        message: message.to_string(),
    };

    let entries = payload
        .as_map()
        .and_then(|map| map.get(POLICIES_KEY))
        .and_then(Value::as_list)
        .ok_or_else(|| malformed("expected a list under 'policies'"))?;

    entries
        .iter()
        .map(|entry| {
            let entry = entry
                .as_map()
                .ok_or_else(|| malformed("policy entries must be maps"))?;
            let policy_type = entry
                .get(POLICY_TYPE_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("policy entry has no 'policyType'"))?;
            let config = match entry.get(POLICY_CONFIG_KEY) {
                None | Some(Value::Null) => Default::default(),
                Some(Value::Map(config)) => config.clone(),
                Some(_) => return Err(malformed("'config' must be a map")),
            };
            Ok(PolicySpec {
                name: policy_name.to_string(),
                policy_type: policy_type.to_string(),
                config,
            })
        })
        .collect()
}
