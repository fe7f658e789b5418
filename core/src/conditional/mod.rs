// px/src/conditional/mod.rs

//! Predicate-gated branching.
//!
//! Each conditional combinator adds one chained step, tapped by the before/after
//! hooks like any other. The predicate is evaluated on that step's input.
//! Steps given to `conditional_chain` run as a plain sequence inside it and are
//! not tapped individually.

use crate::core::{Predicate, Step, Value};
use crate::pipeline::transform::Transform;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tracing::{event, Level};

impl Pipeline {
  /// If `predicate` holds for the input, applies `steps` in order; otherwise
  /// passes the input through unchanged.
  ///
  /// An empty `steps` is accepted and behaves as identity either way.
  pub fn conditional_chain<I>(&self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static, steps: I) -> Self
  where
    I: IntoIterator<Item = Step>,
  {
    let on_true = Transform::sequence(steps.into_iter().map(Transform::Step).collect());
    event!(Level::DEBUG, on_true = on_true.kind(), "Conditional chain added.");
    self.chain_node(Transform::Conditional {
      predicate: Predicate::new(predicate),
      on_true: Arc::new(on_true),
      on_false: None,
    })
  }

  /// If `predicate` holds for the input, runs `true_pipe`; otherwise passes the
  /// input through unchanged.
  pub fn conditional_pipe(
    &self,
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    true_pipe: Pipeline,
  ) -> Self {
    self.chain_node(Transform::Conditional {
      predicate: Predicate::new(predicate),
      on_true: Arc::new(Transform::Pipe(true_pipe)),
      on_false: None,
    })
  }

  /// Runs exactly one of `true_pipe` or `false_pipe`, depending on `predicate`.
  pub fn conditional_branch(
    &self,
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    true_pipe: Pipeline,
    false_pipe: Pipeline,
  ) -> Self {
    self.chain_node(Transform::Conditional {
      predicate: Predicate::new(predicate),
      on_true: Arc::new(Transform::Pipe(true_pipe)),
      on_false: Some(Arc::new(Transform::Pipe(false_pipe))),
    })
  }

  /// [`Pipeline::conditional_chain`] with a prebuilt [`Predicate`].
  pub fn conditional_chain_when<I>(&self, predicate: &Predicate, steps: I) -> Self
  where
    I: IntoIterator<Item = Step>,
  {
    let predicate = predicate.clone();
    self.conditional_chain(move |value| predicate.test(value), steps)
  }
}
