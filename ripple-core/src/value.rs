//! Payloads
//!
//! The engine never looks inside the values it moves around. All it needs
//! is to clone them and, when strict payload typing is enabled, to compare
//! their kinds so that a source declared with an integer is not suddenly fed
//! a string.
//!
//! Statically typed hosts use plain Rust types (`Graph<i64>`, `Graph<String>`).
//! Dynamically typed hosts use [`Value`], a small tagged union whose kind is
//! decided per value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value that can live in a signal graph.
pub trait Payload: Clone + fmt::Debug + Send + 'static {
    /// Name of this value's runtime kind.
    ///
    /// Two values are compatible for `emit` when their kinds are equal.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! impl_payload {
    ($($ty:ty),* $(,)?) => {
        $(impl Payload for $ty {})*
    };
}

impl_payload!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_payload!(f32, f64, bool, char, String, &'static str, ());

impl<T: Payload> Payload for Option<T> {}
impl<T: Payload> Payload for Vec<T> {}

/// Dynamically typed payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The integer held, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The text held, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl Payload for Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
