// px/src/core/collector.rs

//! Fan-in strategies for parallel fan-out. A `Collector` folds the branch
//! results, already assembled in declaration order, into a single `Value`.

use super::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type CollectFn = Arc<dyn Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct Collector {
  name: &'static str,
  fold: CollectFn,
}

impl Collector {
  /// A custom fold over the ordered results.
  pub fn new(fold: impl Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
    Self {
      name: "custom",
      fold: Arc::new(fold),
    }
  }

  /// Collects results into a `Value::List` in declaration order.
  pub fn to_list() -> Self {
    Self {
      name: "to_list",
      fold: Arc::new(|values| Ok(Value::List(values))),
    }
  }

  /// Joins the display form of every result with `separator`.
  pub fn joining<S: Into<String>>(separator: S) -> Self {
    let separator = separator.into();
    Self {
      name: "joining",
      fold: Arc::new(move |values| {
        let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
        Ok(Value::Str(parts.join(&separator)))
      }),
    }
  }

  /// Groups results under the key derived by `key_fn`, keeping declaration
  /// order inside each group.
  pub fn grouping_by(key_fn: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
    Self {
      name: "grouping_by",
      fold: Arc::new(move |values| {
        let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for value in values {
          groups.entry(key_fn(&value)).or_default().push(value);
        }
        Ok(Value::Map(
          groups.into_iter().map(|(key, group)| (key, Value::List(group))).collect(),
        ))
      }),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub(crate) fn collect(&self, values: Vec<Value>) -> anyhow::Result<Value> {
    (self.fold)(values)
  }
}

impl Default for Collector {
  fn default() -> Self {
    Collector::to_list()
  }
}

impl std::fmt::Debug for Collector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Collector").field("name", &self.name).finish()
  }
}
