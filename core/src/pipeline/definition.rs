// px/src/pipeline/definition.rs

//! Contains the `Pipeline` struct, its construction options, and sequential
//! chaining.

use crate::core::pool::{RayonPool, TaskPool};
use crate::core::{HookRegistry, Step, Value};
use crate::error::{PxError, PxResult};
use crate::pipeline::transform::Transform;
use std::sync::Arc;
use tracing::{event, Level};

/// Callback invoked with the final output of a successful asynchronous run.
pub type ResultCallback = Arc<dyn Fn(Value) + Send + Sync + 'static>;

/// Handler invoked with the failure of an asynchronous run. Returning `Err`
/// means the handler itself failed; that failure is not intercepted.
pub type ErrorHandler = Arc<dyn Fn(PxError) -> anyhow::Result<()> + Send + Sync + 'static>;

/// What the default error handler does with a failure from `execute_async`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
  /// Treat the failure as handled and drop it without a trace. Unless a handler
  /// is subscribed, failed asynchronous runs are invisible.
  #[default]
  Identity,
  /// Log the failure at `ERROR` through `tracing`, then drop it.
  LogAndDrop,
}

impl ErrorPolicy {
  pub(crate) fn handler(self) -> ErrorHandler {
    match self {
      ErrorPolicy::Identity => Arc::new(|_failure: PxError| -> anyhow::Result<()> { Ok(()) }),
      ErrorPolicy::LogAndDrop => Arc::new(|failure: PxError| -> anyhow::Result<()> {
        event!(Level::ERROR, error = %failure, "Asynchronous pipeline execution failed.");
        Ok(())
      }),
    }
  }
}

/// Construction-time configuration for a root `Pipeline`. Every pipeline
/// derived from that root inherits it.
#[derive(Clone)]
pub struct PipelineOptions {
  pub error_policy: ErrorPolicy,
  pub pool: Arc<dyn TaskPool>,
}

impl PipelineOptions {
  pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
    self.error_policy = error_policy;
    self
  }

  pub fn with_pool<P: TaskPool>(mut self, pool: P) -> Self {
    self.pool = Arc::new(pool);
    self
  }

  pub fn with_shared_pool(mut self, pool: Arc<dyn TaskPool>) -> Self {
    self.pool = pool;
    self
  }
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      error_policy: ErrorPolicy::default(),
      pool: Arc::new(RayonPool::global()),
    }
  }
}

impl std::fmt::Debug for PipelineOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PipelineOptions")
      .field("error_policy", &self.error_policy)
      .field("pool", &self.pool.name())
      .finish()
  }
}

/// An immutable, composable pipeline.
///
/// Every combinator returns a new `Pipeline`; the receiver is left untouched
/// and can keep being used and executed. The before/after hook registries are
/// the exception: they are shared by every pipeline derived from the same root,
/// so subscribing a hook anywhere in the tree makes it visible everywhere.
///
/// Cloning is cheap: all fields are reference counted.
#[derive(Clone)]
pub struct Pipeline {
  /// `None` means "stringify passthrough".
  pub(crate) transform: Option<Arc<Transform>>,

  pub(crate) before: HookRegistry,
  pub(crate) after: HookRegistry,

  pub(crate) on_result: ResultCallback,
  pub(crate) on_error: ErrorHandler,

  pub(crate) pool: Arc<dyn TaskPool>,
}

impl Pipeline {
  /// Creates an empty pipeline with default options: identity error handler,
  /// no-op result callback, rayon global pool.
  pub fn new() -> Self {
    Self::with_options(PipelineOptions::default())
  }

  pub fn with_options(options: PipelineOptions) -> Self {
    event!(Level::DEBUG, error_policy = ?options.error_policy, pool = options.pool.name(), "Pipeline created.");
    Self {
      transform: None,
      before: HookRegistry::new(),
      after: HookRegistry::new(),
      on_result: Arc::new(|_output: Value| {}),
      on_error: options.error_policy.handler(),
      pool: options.pool,
    }
  }

  /// True if no combinator has added a transform yet.
  pub fn is_empty(&self) -> bool {
    self.transform.is_none()
  }

  pub fn before_hooks(&self) -> &HookRegistry {
    &self.before
  }

  pub fn after_hooks(&self) -> &HookRegistry {
    &self.after
  }

  pub fn pool(&self) -> &Arc<dyn TaskPool> {
    &self.pool
  }

  // --- Derivation helpers ---

  /// A copy of this pipeline with a different composed transform. Hooks,
  /// callbacks and pool are shared, not copied.
  pub(crate) fn with_transform(&self, transform: Transform) -> Self {
    Self {
      transform: Some(Arc::new(transform)),
      ..self.clone()
    }
  }

  /// This pipeline's own transform, or the stringify passthrough if empty.
  pub(crate) fn own_transform(&self) -> Arc<Transform> {
    self
      .transform
      .clone()
      .unwrap_or_else(|| Arc::new(Transform::Stringify))
  }

  /// Appends `node` after the existing transform, without tapping it.
  fn append(&self, node: Transform) -> Self {
    let composed = match &self.transform {
      Some(existing) => Transform::followed_by(existing, node),
      None => node,
    };
    self.with_transform(composed)
  }

  /// Wraps `node` in this pipeline's before/after taps and appends it as one
  /// chained step. Every combinator except `compose` goes through here.
  pub(crate) fn chain_node(&self, node: Transform) -> Self {
    event!(Level::TRACE, node_kind = node.kind(), "Chaining node.");
    self.append(Transform::tapped(node, &self.before, &self.after))
  }

  // --- Sequential chaining ---

  /// Appends `steps` after the existing transform, each one tapped by the
  /// before/after hooks, in the given order.
  ///
  /// Fails with `CompositionPrecondition` if `steps` is empty.
  pub fn chain<I>(&self, steps: I) -> PxResult<Self>
  where
    I: IntoIterator<Item = Step>,
  {
    let tapped: Vec<Transform> = steps
      .into_iter()
      .map(|step| Transform::tapped(Transform::Step(step), &self.before, &self.after))
      .collect();
    if tapped.is_empty() {
      return Err(PxError::precondition("chain", "at least one step is required"));
    }
    event!(Level::DEBUG, num_steps = tapped.len(), "Steps chained.");
    Ok(self.append(Transform::sequence(tapped)))
  }

  /// Chains a single step. Never fails.
  pub fn then(&self, step: Step) -> Self {
    self.append(Transform::tapped(Transform::Step(step), &self.before, &self.after))
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("transform", &self.transform)
      .field("before", &self.before)
      .field("after", &self.after)
      .field("pool", &self.pool.name())
      .finish()
  }
}
