// px/src/pipeline/compose.rs

//! Pipe-to-pipe combinators: building a pipeline out of other pipelines.
//!
//! An embedded pipeline contributes only its composed transform. Its own hooks
//! still fire for its own steps, but its result callback and error handler are
//! never consulted; failures surface through the outer pipeline.

use crate::core::Collector;
use crate::error::{PxError, PxResult};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::transform::Transform;
use std::sync::Arc;
use tracing::{event, Level};

impl Pipeline {
  /// Runs every pipeline in `pipes` concurrently on the same input and
  /// collects their outputs into a `Value::List` in declaration order.
  ///
  /// Fails with `CompositionPrecondition` if `pipes` is empty.
  pub fn branch<I>(&self, pipes: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Pipeline>,
  {
    self.branch_with_collector(Collector::to_list(), pipes)
  }

  /// Like [`Pipeline::branch`], but folds the ordered outputs with `collector`.
  pub fn branch_with_collector<I>(&self, collector: Collector, pipes: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Pipeline>,
  {
    let branches: Vec<Transform> = pipes.into_iter().map(Transform::Pipe).collect();
    if branches.is_empty() {
      return Err(PxError::precondition("branch", "at least one pipe is required"));
    }
    Ok(self.fan_out_node("branch", branches, collector))
  }

  /// Runs `pipes` one after another, each fed the output of the previous one,
  /// as a single chained step.
  ///
  /// Fails with `CompositionPrecondition` if `pipes` is empty.
  pub fn concat<I>(&self, pipes: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Pipeline>,
  {
    let stages: Vec<Transform> = pipes.into_iter().map(Transform::Pipe).collect();
    if stages.is_empty() {
      return Err(PxError::precondition("concat", "at least one pipe is required"));
    }
    event!(Level::DEBUG, num_pipes = stages.len(), "Pipes concatenated.");
    Ok(self.chain_node(Transform::sequence(stages)))
  }

  /// Runs `pipe_after` as the next chained step.
  pub fn and_then(&self, pipe_after: Pipeline) -> Self {
    self.chain_node(Transform::Pipe(pipe_after))
  }

  /// Returns a pipeline that first runs `pipe_before`, then this pipeline's
  /// own transform on its output.
  ///
  /// Unlike [`Pipeline::and_then`], the prepended stage is not tapped by this
  /// pipeline's before/after hooks. Only steps added through `chain` and the
  /// other chaining combinators are observed by them.
  pub fn compose(&self, pipe_before: Pipeline) -> Self {
    event!(Level::DEBUG, "Pipe composed in front.");
    let own = self.own_transform();
    self.with_transform(Transform::Sequence(vec![Arc::new(Transform::Pipe(pipe_before)), own]))
  }
}
