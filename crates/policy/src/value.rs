use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A policy document: string keys mapped to policy values.
pub type PolicyDocument = BTreeMap<String, PolicyValue>;

/// Recursive policy value: a scalar, a sequence or a nested mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum PolicyValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<PolicyValue>),
    Mapping(PolicyDocument),
}

impl PolicyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PolicyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PolicyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[PolicyValue]> {
        match self {
            PolicyValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&PolicyDocument> {
        match self {
            PolicyValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, PolicyValue::Sequence(_) | PolicyValue::Mapping(_))
    }
}

impl From<Value> for PolicyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PolicyValue::Null,
            Value::Bool(b) => PolicyValue::Bool(b),
            Value::Number(n) => PolicyValue::Number(n),
            Value::String(s) => PolicyValue::String(s),
            Value::Array(items) => {
                PolicyValue::Sequence(items.into_iter().map(PolicyValue::from).collect())
            }
            Value::Object(map) => PolicyValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, PolicyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PolicyValue> for Value {
    fn from(value: PolicyValue) -> Self {
        match value {
            PolicyValue::Null => Value::Null,
            PolicyValue::Bool(b) => Value::Bool(b),
            PolicyValue::Number(n) => Value::Number(n),
            PolicyValue::String(s) => Value::String(s),
            PolicyValue::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            PolicyValue::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<bool> for PolicyValue {
    fn from(b: bool) -> Self {
        PolicyValue::Bool(b)
    }
}

impl From<&str> for PolicyValue {
    fn from(s: &str) -> Self {
        PolicyValue::String(s.to_string())
    }
}

impl From<Vec<PolicyValue>> for PolicyValue {
    fn from(items: Vec<PolicyValue>) -> Self {
        PolicyValue::Sequence(items)
    }
}

impl From<PolicyDocument> for PolicyValue {
    fn from(map: PolicyDocument) -> Self {
        PolicyValue::Mapping(map)
    }
}
