//! Runtime values and the type expressions used to check them.
//!
//! Values are a closed enum so that type membership can be decided by pattern
//! matching. A [`TypeSpec`] is the runtime-checkable type expression a
//! descriptor is configured with: a single type, a union, or a parameterised
//! container.

use crate::core::error::{DescriptorError, DescriptorResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically typed value stored in a validated attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// String-keyed map, iterated in insertion order
    Map(IndexMap<String, Value>),
    /// Represents absence of value
    None,
}

/// The runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// [`Value::Integer`]
    Integer,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Boolean`]
    Boolean,
    /// [`Value::Array`]
    Array,
    /// [`Value::Map`]
    Map,
    /// [`Value::None`]
    None,
}

/// A runtime-checkable type expression.
///
/// `Param` stands for an unbound generic placeholder. It can be written down
/// but never checked against, so any spec containing one is rejected by
/// [`TypeSpec::ensure_checkable`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "inner")]
pub enum TypeSpec {
    /// Accepts every value
    Any,
    /// Integers only
    Integer,
    /// Integer or float
    Real,
    /// Floats only
    Float,
    /// Strings
    String,
    /// Booleans
    Boolean,
    /// Only the absent value
    None,
    /// Array whose elements all match the inner spec
    Array(Box<TypeSpec>),
    /// Map whose values all match the inner spec
    Map(Box<TypeSpec>),
    /// Matches if any member matches
    Union(Vec<TypeSpec>),
    /// Unbound generic placeholder
    Param(String),
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the runtime type of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::None => ValueKind::None,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a real number. Integers are widened.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        if let Value::Array(arr) = self {
            Some(arr)
        } else {
            None
        }
    }

    /// Try to get this value as a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        if let Value::Map(map) = self {
            Some(map)
        } else {
            None
        }
    }

    /// Check if this is the `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Number of members for sized values (characters for strings).
    pub fn member_count(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.len()),
            Value::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Truthiness: empty containers, zero, `false` and `None` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Array(arr) => !arr.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::None => false,
        }
    }

    /// Convert into plain JSON (untagged).
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::None => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Array(arr) => write!(f, "Array[{}]", arr.len()),
            Value::Map(map) => write!(f, "Map{{{} entries}}", map.len()),
            Value::None => write!(f, "None"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ============================================================================
// ValueKind Implementation
// ============================================================================

impl ValueKind {
    /// Get a human-readable name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::None => "none",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// TypeSpec Implementation
// ============================================================================

impl TypeSpec {
    /// Array of any element type.
    pub fn array() -> Self {
        TypeSpec::Array(Box::new(TypeSpec::Any))
    }

    /// Array whose elements match `inner`.
    pub fn array_of(inner: TypeSpec) -> Self {
        TypeSpec::Array(Box::new(inner))
    }

    /// Map of any value type.
    pub fn map() -> Self {
        TypeSpec::Map(Box::new(TypeSpec::Any))
    }

    /// Map whose values match `inner`.
    pub fn map_of(inner: TypeSpec) -> Self {
        TypeSpec::Map(Box::new(inner))
    }

    /// Union of the given members.
    pub fn union(members: impl IntoIterator<Item = TypeSpec>) -> Self {
        TypeSpec::Union(members.into_iter().collect())
    }

    /// Unbound generic placeholder, e.g. `T`.
    pub fn param(name: impl Into<String>) -> Self {
        TypeSpec::Param(name.into())
    }

    /// Check if a value is a member of this type.
    ///
    /// Always `false` for placeholders; callers are expected to have run
    /// [`TypeSpec::ensure_checkable`] first.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeSpec::Any, _) => true,
            (TypeSpec::Integer, Value::Integer(_)) => true,
            (TypeSpec::Real, Value::Integer(_) | Value::Float(_)) => true,
            (TypeSpec::Float, Value::Float(_)) => true,
            (TypeSpec::String, Value::String(_)) => true,
            (TypeSpec::Boolean, Value::Boolean(_)) => true,
            (TypeSpec::None, Value::None) => true,
            (TypeSpec::Array(inner), Value::Array(arr)) => arr.iter().all(|v| inner.matches(v)),
            (TypeSpec::Map(inner), Value::Map(map)) => map.values().all(|v| inner.matches(v)),
            (TypeSpec::Union(members), value) => members.iter().any(|m| m.matches(value)),
            _ => false,
        }
    }

    /// Verify that this spec can be used for runtime membership checks.
    pub fn ensure_checkable(&self) -> DescriptorResult<()> {
        match self {
            TypeSpec::Param(name) => Err(DescriptorError::Configuration {
                type_spec: self.display_name(),
                reason: format!(
                    "unbound type parameter '{}' cannot be checked at runtime; \
                     expected a type, a union of types, or a container of types",
                    name
                ),
            }),
            TypeSpec::Union(members) if members.is_empty() => Err(DescriptorError::Configuration {
                type_spec: self.display_name(),
                reason: "an empty union accepts no values".to_string(),
            }),
            TypeSpec::Union(members) => members.iter().try_for_each(|m| m.ensure_checkable()),
            TypeSpec::Array(inner) | TypeSpec::Map(inner) => inner.ensure_checkable(),
            _ => Ok(()),
        }
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> String {
        match self {
            TypeSpec::Any => "any".to_string(),
            TypeSpec::Integer => "integer".to_string(),
            TypeSpec::Real => "real number".to_string(),
            TypeSpec::Float => "float".to_string(),
            TypeSpec::String => "string".to_string(),
            TypeSpec::Boolean => "boolean".to_string(),
            TypeSpec::None => "none".to_string(),
            TypeSpec::Array(inner) if **inner == TypeSpec::Any => "array".to_string(),
            TypeSpec::Array(inner) => format!("array of {}", inner.display_name()),
            TypeSpec::Map(inner) if **inner == TypeSpec::Any => "map".to_string(),
            TypeSpec::Map(inner) => format!("map of {}", inner.display_name()),
            TypeSpec::Union(members) => members
                .iter()
                .map(TypeSpec::display_name)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeSpec::Param(name) => name.clone(),
        }
    }
}

impl Default for TypeSpec {
    fn default() -> Self {
        TypeSpec::Any
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
