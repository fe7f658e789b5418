// px/src/pipeline/parallel.rs

//! Parallel fan-out over raw steps.
//!
//! Each branch receives a clone of the same input. Branches may run in any
//! order on the pipeline's pool, but their results are always assembled in
//! declaration order. The fan-out as a whole is a single chained step: the
//! before/after hooks fire once around it, not once per branch.

use crate::core::{Collector, Step};
use crate::error::{PxError, PxResult};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::transform::Transform;
use std::sync::Arc;
use tracing::{event, Level};

impl Pipeline {
  /// Runs `steps` concurrently on the same input and collects their outputs
  /// into a `Value::List` in declaration order.
  ///
  /// Fails with `CompositionPrecondition` if `steps` is empty.
  pub fn parallel_chain<I>(&self, steps: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Step>,
  {
    self.parallel_chain_with_collector(Collector::to_list(), steps)
  }

  /// Like [`Pipeline::parallel_chain`], but folds the ordered outputs with
  /// `collector`.
  pub fn parallel_chain_with_collector<I>(&self, collector: Collector, steps: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Step>,
  {
    let branches: Vec<Transform> = steps.into_iter().map(Transform::Step).collect();
    if branches.is_empty() {
      return Err(PxError::precondition("parallel_chain", "at least one step is required"));
    }
    Ok(self.fan_out_node("parallel_chain", branches, collector))
  }

  /// Chains a fan-out over `branches` that runs on this pipeline's pool.
  pub(crate) fn fan_out_node(&self, combinator: &str, branches: Vec<Transform>, collector: Collector) -> Self {
    event!(
      Level::DEBUG,
      combinator,
      num_branches = branches.len(),
      collector = collector.name(),
      "Fan-out chained."
    );
    self.chain_node(Transform::FanOut {
      branches: branches.into_iter().map(Arc::new).collect(),
      collector,
      pool: Arc::clone(&self.pool),
    })
  }
}
