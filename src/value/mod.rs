//! Defines the [`Value`] enum, representing the context data a template is
//! rendered with.

mod from;
#[cfg(feature = "serde")]
mod json;

pub use std::collections::BTreeMap as Map;
use std::mem;
pub use std::vec::Vec as List;

#[cfg(feature = "serde")]
pub use crate::value::json::to_value;

/// Data to be rendered represented as a recursive enum.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for Value {}

impl Value {
    pub(crate) fn human(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Merge `other` on top of `self`.
    ///
    /// Both values must be maps for anything to happen. Keys in `other` win
    /// unless their value is [`Value::None`], in which case the existing
    /// value is kept.
    pub(crate) fn merged(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Map(base), Value::Map(data)) => {
                let mut map = base.clone();
                for (k, v) in data {
                    if matches!(v, Value::None) && map.contains_key(k) {
                        continue;
                    }
                    map.insert(k.clone(), v.clone());
                }
                Value::Map(map)
            }
            (_, Value::None) => self.clone(),
            _ => other.clone(),
        }
    }
}
