// px/src/pipeline/execution.rs

//! Contains `execute_sync` and `execute_async`, the two ways to run a pipeline.
//!
//! Each call is an independent run over the same immutable pipeline:
//! Built → Running → Completed or Failed. Synchronous runs hand the result or
//! failure straight back to the caller. Asynchronous runs go through the
//! pipeline's `TaskPool` and report only through the result callback or the
//! error handler.

use crate::core::Value;
use crate::error::{PxError, PxResult};
use crate::pipeline::definition::Pipeline;
use std::panic::{self, AssertUnwindSafe};
use tracing::{event, instrument, Level};

impl Pipeline {
  /// Runs the pipeline on the calling thread and returns its output.
  ///
  /// Failures propagate directly; the error handler and result callback are
  /// not consulted.
  #[instrument(
        name = "Pipeline::execute_sync",
        skip_all,
        fields(input_kind = tracing::field::Empty),
        err(level = "debug", Display)
    )]
  pub fn execute_sync<V: Into<Value>>(&self, input: V) -> PxResult<Value> {
    let input = input.into();
    tracing::Span::current().record("input_kind", input.kind());
    event!(Level::DEBUG, "Synchronous execution starting.");
    let output = self.apply(input)?;
    event!(Level::DEBUG, output_kind = output.kind(), "Synchronous execution completed.");
    Ok(output)
  }

  /// Schedules a run on the pipeline's pool and returns immediately.
  ///
  /// On success the result callback receives the output; on failure the error
  /// handler receives the failure. With the default identity error handler a
  /// failure is silently dropped.
  pub fn execute_async<V: Into<Value>>(&self, input: V) {
    let input = input.into();
    let pipeline = self.clone();
    event!(Level::DEBUG, pool = self.pool.name(), "Scheduling asynchronous execution.");
    self.pool.spawn(Box::new(move || {
      // A panic reaching a rayon worker aborts the process.
      let outcome = panic::catch_unwind(AssertUnwindSafe(|| pipeline.deliver(input)))
        .unwrap_or_else(|payload| Err(PxError::from_panic(payload)));
      if let Err(escaped) = outcome {
        // Nothing above the worker can observe this.
        event!(Level::WARN, error = %escaped, "Error handler failed; the failure escaped the pipeline.");
      }
    }));
  }

  /// Body of an asynchronous run: apply, then route the outcome to the result
  /// callback or the error handler. Returns `Err` only when the error handler
  /// itself fails.
  ///
  /// A panic while applying the transform is delivered to the error handler as
  /// `PxError::Panicked`.
  pub(crate) fn deliver(&self, input: Value) -> PxResult<()> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.apply(input)))
      .unwrap_or_else(|payload| Err(PxError::from_panic(payload)));
    match outcome {
      Ok(output) => {
        event!(Level::DEBUG, output_kind = output.kind(), "Asynchronous execution completed.");
        (self.on_result)(output);
        Ok(())
      }
      Err(failure) => {
        event!(Level::DEBUG, error = %failure, "Asynchronous execution failed, invoking error handler.");
        (self.on_error)(failure).map_err(|source| PxError::ErrorHandlerFailure { source })
      }
    }
  }

  /// Applies the composed transform, or stringifies the input if there is none.
  pub(crate) fn apply(&self, input: Value) -> PxResult<Value> {
    match &self.transform {
      Some(transform) => transform.apply(input),
      None => Ok(input.stringify()),
    }
  }
}
