// px/src/pipeline/hooks.rs

//! Contains methods for subscribing `before` and `after` hooks, the error
//! handler and the result callback, plus `debug_enabled`, which wires all three
//! to a `DebugSink`.
//!
//! Before/after hooks are appended to registries shared by the whole pipeline
//! tree. The error handler and result callback belong to the returned pipeline
//! only, replacing whatever was set before.

use crate::core::{hook, Hook, Value};
use crate::error::PxError;
use crate::pipeline::definition::Pipeline;
use std::sync::Arc;
use tracing::{event, Level};

impl Pipeline {
  /// Appends `hooks` to the shared before-hook registry. Each hook fires with
  /// the input of every chained step, in registration order.
  pub fn subscribe_before<I>(&self, hooks: I) -> Self
  where
    I: IntoIterator<Item = Hook>,
  {
    self.before.append(hooks);
    event!(Level::DEBUG, num_hooks = self.before.len(), "Before hooks subscribed.");
    self.clone()
  }

  /// Appends `hooks` to the shared after-hook registry. Each hook fires with
  /// the output of every chained step, in registration order.
  pub fn subscribe_after<I>(&self, hooks: I) -> Self
  where
    I: IntoIterator<Item = Hook>,
  {
    self.after.append(hooks);
    event!(Level::DEBUG, num_hooks = self.after.len(), "After hooks subscribed.");
    self.clone()
  }

  /// Replaces the error handler used by `execute_async`.
  ///
  /// The handler gets the failure by value. If it returns `Err`, that new
  /// failure is not caught by the pipeline.
  pub fn subscribe_error(&self, handler: impl Fn(PxError) -> anyhow::Result<()> + Send + Sync + 'static) -> Self {
    Self {
      on_error: Arc::new(handler),
      ..self.clone()
    }
  }

  /// Replaces the callback that receives the output of a successful
  /// `execute_async` run. `execute_sync` never calls it.
  pub fn subscribe_result(&self, callback: impl Fn(Value) + Send + Sync + 'static) -> Self {
    Self {
      on_result: Arc::new(callback),
      ..self.clone()
    }
  }

  /// Reports every step input, step output and asynchronous failure through
  /// `tracing` at `INFO`/`ERROR`.
  pub fn debug_enabled(&self) -> Self {
    self.debug_enabled_with(Arc::new(TracingSink))
  }

  /// Reports every step input, step output and asynchronous failure to `sink`.
  /// The error handler installed here reports the failure and then treats it as
  /// handled.
  pub fn debug_enabled_with(&self, sink: Arc<dyn DebugSink>) -> Self {
    let (on_after, on_before, on_error) = (Arc::clone(&sink), Arc::clone(&sink), sink);
    self
      .subscribe_after([hook(move |output| on_after.step_finished(output))])
      .subscribe_before([hook(move |input| on_before.step_started(input))])
      .subscribe_error(move |failure| {
        on_error.failed(&failure);
        Ok(())
      })
  }
}

/// Destination for the diagnostics wired by [`Pipeline::debug_enabled_with`].
pub trait DebugSink: Send + Sync + 'static {
  fn step_started(&self, input: &Value);
  fn step_finished(&self, output: &Value);
  fn failed(&self, failure: &PxError);
}

/// The default sink: `tracing` events under the `px::debug` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
  fn step_started(&self, input: &Value) {
    event!(target: "px::debug", Level::INFO, input = %input, "Step started.");
  }

  fn step_finished(&self, output: &Value) {
    event!(target: "px::debug", Level::INFO, output = %output, "Step finished.");
  }

  fn failed(&self, failure: &PxError) {
    event!(target: "px::debug", Level::ERROR, error = %failure, error_debug = ?failure, "Pipeline failed.");
  }
}
