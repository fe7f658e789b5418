// px/src/pipeline/transform.rs

//! The persistent representation of a composed pipeline transform and the small
//! interpreter that applies it to a `Value`.
//!
//! Combinators never mutate a `Transform`; they wrap existing nodes (shared via
//! `Arc`) in new ones. Hook registries are captured by handle inside `Tap`
//! nodes, so hooks appended later still fire.

use crate::core::pool::{Job, TaskPool};
use crate::core::{Collector, HookRegistry, Predicate, Step, Value};
use crate::error::{PxError, PxResult};
use crate::pipeline::definition::Pipeline;
use std::sync::Arc;
use tracing::{event, span, Level};

pub(crate) enum Transform {
  /// Returns the input unchanged.
  Identity,
  /// Returns the display form of the input as a string value. This is what an
  /// empty pipeline does.
  Stringify,
  Step(Step),
  /// Notifies `before` with the input and `after` with the output of `inner`.
  Tap {
    inner: Arc<Transform>,
    before: HookRegistry,
    after: HookRegistry,
  },
  /// Applies each part to the output of the previous one.
  Sequence(Vec<Arc<Transform>>),
  /// Applies every branch to a clone of the same input on `pool`, then folds
  /// the results, in declaration order, with `collector`.
  FanOut {
    branches: Vec<Arc<Transform>>,
    collector: Collector,
    pool: Arc<dyn TaskPool>,
  },
  /// Applies `on_true` if the predicate holds, otherwise `on_false`, or passes
  /// the input through when there is no `on_false`.
  Conditional {
    predicate: Predicate,
    on_true: Arc<Transform>,
    on_false: Option<Arc<Transform>>,
  },
  /// Runs another pipeline's composed transform.
  Pipe(Pipeline),
}

impl Transform {
  pub(crate) fn tapped(inner: Transform, before: &HookRegistry, after: &HookRegistry) -> Self {
    Transform::Tap {
      inner: Arc::new(inner),
      before: before.clone(),
      after: after.clone(),
    }
  }

  /// A sequence over `parts`, collapsing the trivial cases.
  pub(crate) fn sequence(mut parts: Vec<Transform>) -> Self {
    match parts.len() {
      0 => Transform::Identity,
      1 => parts.remove(0),
      _ => Transform::Sequence(parts.into_iter().map(Arc::new).collect()),
    }
  }

  /// `existing` followed by `next`, as one flat sequence. Nested sequences on
  /// either side are spliced in, so repeated chaining does not deepen the tree.
  pub(crate) fn followed_by(existing: &Arc<Transform>, next: Transform) -> Self {
    let mut parts = match existing.as_ref() {
      Transform::Sequence(parts) => parts.clone(),
      _ => vec![Arc::clone(existing)],
    };
    match next {
      Transform::Sequence(more) => parts.extend(more),
      other => parts.push(Arc::new(other)),
    }
    Transform::Sequence(parts)
  }

  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Transform::Identity => "identity",
      Transform::Stringify => "stringify",
      Transform::Step(_) => "step",
      Transform::Tap { .. } => "tap",
      Transform::Sequence(_) => "sequence",
      Transform::FanOut { .. } => "fan_out",
      Transform::Conditional { .. } => "conditional",
      Transform::Pipe(_) => "pipe",
    }
  }

  /// Applies this transform to `input`.
  ///
  /// The first failure aborts the enclosing sequence; nothing after the failing
  /// node runs.
  pub(crate) fn apply(&self, input: Value) -> PxResult<Value> {
    match self {
      Transform::Identity => Ok(input),
      Transform::Stringify => Ok(input.stringify()),
      Transform::Step(step) => {
        event!(Level::TRACE, step_name = step.name().unwrap_or("<anonymous>"), input_kind = input.kind(), "Applying step.");
        step.call(input).map_err(PxError::from)
      }
      Transform::Tap { inner, before, after } => {
        before.notify(&input);
        let output = inner.apply(input)?;
        after.notify(&output);
        Ok(output)
      }
      Transform::Sequence(parts) => parts.iter().try_fold(input, |acc, part| part.apply(acc)),
      Transform::FanOut {
        branches,
        collector,
        pool,
      } => apply_fan_out(branches, collector, pool.as_ref(), input),
      Transform::Conditional {
        predicate,
        on_true,
        on_false,
      } => {
        if predicate.test(&input) {
          event!(Level::TRACE, "Condition held, taking the true path.");
          on_true.apply(input)
        } else if let Some(on_false) = on_false {
          event!(Level::TRACE, "Condition failed, taking the false path.");
          on_false.apply(input)
        } else {
          event!(Level::TRACE, "Condition failed, passing input through.");
          Ok(input)
        }
      }
      Transform::Pipe(pipeline) => pipeline.apply(input),
    }
  }
}

// Every branch runs to completion; there is no cancellation. If any branch
// failed, the whole fan-out fails with the earliest-declared failure.
fn apply_fan_out(
  branches: &[Arc<Transform>],
  collector: &Collector,
  pool: &dyn TaskPool,
  input: Value,
) -> PxResult<Value> {
  let fan_out_span = span!(
    Level::DEBUG,
    "fan_out",
    num_branches = branches.len(),
    collector = collector.name(),
    pool = pool.name()
  );
  let _fan_out_guard = fan_out_span.enter();

  let jobs: Vec<Job> = branches
    .iter()
    .map(|branch| {
      let branch = Arc::clone(branch);
      let branch_input = input.clone();
      let job: Job = Box::new(move || branch.apply(branch_input));
      job
    })
    .collect();

  let mut values = Vec::with_capacity(branches.len());
  for (index, result) in pool.fan_out(jobs).into_iter().enumerate() {
    match result {
      Ok(value) => values.push(value),
      Err(e) => {
        event!(Level::DEBUG, branch_index = index, error = %e, "Fan-out branch failed.");
        return Err(PxError::BranchFailure {
          index,
          source: Box::new(e),
        });
      }
    }
  }

  collector
    .collect(values)
    .map_err(|source| PxError::CollectorFailure { source })
}

impl std::fmt::Debug for Transform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Transform::Identity | Transform::Stringify => f.write_str(self.kind()),
      Transform::Step(step) => f.debug_tuple("Step").field(&step.name()).finish(),
      Transform::Tap { inner, .. } => f.debug_tuple("Tap").field(inner).finish(),
      Transform::Sequence(parts) => f.debug_tuple("Sequence").field(parts).finish(),
      Transform::FanOut {
        branches, collector, ..
      } => f
        .debug_struct("FanOut")
        .field("branches", branches)
        .field("collector", &collector.name())
        .finish(),
      Transform::Conditional { on_true, on_false, .. } => f
        .debug_struct("Conditional")
        .field("on_true", on_true)
        .field("on_false", on_false)
        .finish(),
      Transform::Pipe(_) => f.write_str("Pipe(..)"),
    }
  }
}
