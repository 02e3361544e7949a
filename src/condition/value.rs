//! Condition operand values.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::types::OneOrMany;

/// A scalar operand as written in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// A boolean, accepting both `true` and the string `"true"` (any case).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            Value::Int(_) => None,
        }
    }

    /// An integer, accepting both `10` and the string `"10"`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(_) => None,
        }
    }
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// A non-empty, unordered set of operand values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueSet(BTreeSet<Value>);

impl ValueSet {
    /// Build a set, rejecting empty input and duplicate values.
    pub fn new<I, V>(values: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut set = BTreeSet::new();
        for value in values {
            let value = value.into();
            if set.contains(&value) {
                return Err(PolicyError::duplicate("ValueSet", value));
            }
            set.insert(value);
        }
        if set.is_empty() {
            return Err(PolicyError::EmptySet("ValueSet".to_string()));
        }
        Ok(ValueSet(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.contains(value)
    }

    pub fn intersection(&self, other: &ValueSet) -> BTreeSet<Value> {
        self.0.intersection(&other.0).cloned().collect()
    }
}

impl Display for ValueSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

impl Serialize for ValueSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for ValueSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = OneOrMany::<Value>::deserialize(deserializer)?;
        ValueSet::new(values.into_vec()).map_err(serde::de::Error::custom)
    }
}
