// px/src/core/value.rs

//! Defines `Value`, the dynamic value that flows through every pipeline.
//!
//! This is the one place where px gives up compile-time typing: steps, hooks,
//! predicates and collectors all exchange `Value`s, and callers recover typed
//! data through the `as_*` accessors or by matching on the variants.

use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed value passed between pipeline steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  #[default]
  Unit,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(BTreeMap<String, Value>),
}

impl Value {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Value::List(items) => Some(items.as_slice()),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
    match self {
      Value::Map(entries) => Some(entries),
      _ => None,
    }
  }

  pub fn into_list(self) -> Option<Vec<Value>> {
    match self {
      Value::List(items) => Some(items),
      _ => None,
    }
  }

  pub fn is_unit(&self) -> bool {
    matches!(self, Value::Unit)
  }

  /// Short name of the variant, used in diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      Value::Unit => "unit",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Str(_) => "str",
      Value::List(_) => "list",
      Value::Map(_) => "map",
    }
  }

  /// The display form of this value as a `Value::Str`.
  pub fn stringify(&self) -> Value {
    match self {
      Value::Str(s) => Value::Str(s.clone()),
      other => Value::Str(other.to_string()),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Unit => f.write_str("()"),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Int(i) => write!(f, "{}", i),
      Value::Float(x) => write!(f, "{}", x),
      Value::Str(s) => f.write_str(s),
      Value::List(items) => {
        f.write_str("[")?;
        for (idx, item) in items.iter().enumerate() {
          if idx > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}", item)?;
        }
        f.write_str("]")
      }
      Value::Map(entries) => {
        f.write_str("{")?;
        for (idx, (key, item)) in entries.iter().enumerate() {
          if idx > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}={}", key, item)?;
        }
        f.write_str("}")
      }
    }
  }
}

impl From<()> for Value {
  fn from(_: ()) -> Self {
    Value::Unit
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self {
    Value::Float(x)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<&String> for Value {
  fn from(s: &String) -> Self {
    Value::Str(s.clone())
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(items: Vec<T>) -> Self {
    Value::List(items.into_iter().map(Into::into).collect())
  }
}

impl From<BTreeMap<String, Value>> for Value {
  fn from(entries: BTreeMap<String, Value>) -> Self {
    Value::Map(entries)
  }
}

impl<T: Into<Value>> FromIterator<T> for Value {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Value::List(iter.into_iter().map(Into::into).collect())
  }
}

impl PartialEq<&str> for Value {
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == Some(*other)
  }
}

impl PartialEq<str> for Value {
  fn eq(&self, other: &str) -> bool {
    self.as_str() == Some(other)
  }
}

impl PartialEq<i64> for Value {
  fn eq(&self, other: &i64) -> bool {
    self.as_int() == Some(*other)
  }
}
