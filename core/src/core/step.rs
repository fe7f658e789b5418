// px/src/core/step.rs

//! Defines the caller-supplied units of work a pipeline is built from:
//! `Step` (a fallible `Value -> Value` function) and `Predicate` (the gate used
//! by conditional combinators).

use super::Value;
use std::sync::Arc;

/// Type alias for the erased step closure.
pub type StepFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static>;

/// Type alias for the erased predicate closure.
/// It takes a read-only reference to the value about to be routed.
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync + 'static>;

/// A single transformation step.
///
/// Cloning a `Step` is cheap; clones share the same closure.
#[derive(Clone)]
pub struct Step {
  pub(crate) name: Option<String>,
  pub(crate) func: StepFn,
}

impl Step {
  pub fn new(func: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
    Self {
      name: None,
      func: Arc::new(func),
    }
  }

  /// A step carrying a name. The name only shows up in tracing output.
  pub fn named<S: Into<String>>(
    name: S,
    func: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
  ) -> Self {
    Self {
      name: Some(name.into()),
      func: Arc::new(func),
    }
  }

  /// A step that can never fail.
  pub fn infallible(func: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
    Self::new(move |value| Ok(func(value)))
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub(crate) fn call(&self, input: Value) -> anyhow::Result<Value> {
    (self.func)(input)
  }
}

/// Shorthand for [`Step::new`].
pub fn step(func: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static) -> Step {
  Step::new(func)
}

// By default, StepFn (Arc<dyn Fn...>) doesn't implement Debug.
impl std::fmt::Debug for Step {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Step").field("name", &self.name).finish()
  }
}

/// A condition evaluated against the input of a conditional combinator.
#[derive(Clone)]
pub struct Predicate(pub(crate) PredicateFn);

impl Predicate {
  pub fn new(func: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
    Self(Arc::new(func))
  }

  /// Holds when the input equals `expected`.
  pub fn equals<V: Into<Value>>(expected: V) -> Self {
    let expected = expected.into();
    Self::new(move |value| *value == expected)
  }

  pub fn test(&self, value: &Value) -> bool {
    (self.0)(value)
  }
}

impl std::fmt::Debug for Predicate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Predicate(..)")
  }
}
