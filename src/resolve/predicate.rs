use crate::spec::{EntitySpec, PLAN_ID, Value};
use std::fmt;

/// Tests whether a spec's current config value for `key` equals `expected`.
///
/// A spec with no value for the key never matches.
#[derive(Debug, Clone, Copy)]
pub struct ConfigEquals<'a> {
    key: &'a str,
    expected: &'a Value,
}

impl<'a> ConfigEquals<'a> {
    pub fn new(key: &'a str, expected: &'a Value) -> Self {
        Self { key, expected }
    }

    pub fn matches(&self, spec: &EntitySpec) -> bool {
        spec.config(self.key) == Some(self.expected)
    }
}

impl fmt::Display for ConfigEquals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config_equals({}, {})", self.key, self.expected)
    }
}

pub fn config_equals<'a>(key: &'a str, expected: &'a Value) -> ConfigEquals<'a> {
    ConfigEquals::new(key, expected)
}

/// [`config_equals`] over the plan-id key.
pub fn has_plan_id(plan_id: &str) -> impl Fn(&EntitySpec) -> bool {
    let expected = Value::from(plan_id);
    move |spec| config_equals(PLAN_ID, &expected).matches(spec)
}
