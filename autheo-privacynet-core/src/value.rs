use serde::{Deserialize, Serialize};

/// Runtime tag of an atomic value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    Bool,
    Int,
    Float,
    Str,
}

impl AtomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomKind::Bool => "bool",
            AtomKind::Int => "int",
            AtomKind::Float => "float",
            AtomKind::Str => "str",
        }
    }
}

/// Data flowing through transformation and measurement functions.
///
/// `Vector` holds homogeneous datasets described by a vector domain, while
/// `Tuple` holds the ordered outputs of a composed measurement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vector(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn atom_kind(&self) -> Option<AtomKind> {
        match self {
            Value::Bool(_) => Some(AtomKind::Bool),
            Value::Int(_) => Some(AtomKind::Int),
            Value::Float(_) => Some(AtomKind::Float),
            Value::Str(_) => Some(AtomKind::Str),
            Value::Vector(_) | Value::Tuple(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Vector(_) => "vector",
            Value::Tuple(_) => "tuple",
            other => other.atom_kind().map(|kind| kind.as_str()).unwrap_or("atom"),
        }
    }

    /// Numeric view used by arithmetic transformations.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Value]> {
        match self {
            Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn floats(values: impl IntoIterator<Item = f64>) -> Self {
        Value::Vector(values.into_iter().map(Value::Float).collect())
    }

    pub fn ints(values: impl IntoIterator<Item = i64>) -> Self {
        Value::Vector(values.into_iter().map(Value::Int).collect())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}
