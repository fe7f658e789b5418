// px/src/error.rs
use anyhow::Error as AnyhowError;
use std::any::Any;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PxError {
  /// A user-provided step returned an error. The failure itself stays opaque.
  #[error("Step failed: {source}")]
  StepFailure {
    #[source]
    source: AnyhowError,
  },

  /// A combinator was called with a required argument missing or empty.
  /// Raised while the pipeline is being built, never during execution.
  #[error("Composition precondition failed for '{combinator}': {message}")]
  CompositionPrecondition { combinator: String, message: String },

  #[error("Branch {index} of parallel fan-out failed: {source}")]
  BranchFailure {
    index: usize,
    #[source]
    source: Box<PxError>,
  },

  #[error("Collector failed to fold fan-out results. Source: {source}")]
  CollectorFailure {
    #[source]
    source: AnyhowError,
  },

  #[error("Error handler failed while handling a pipeline failure. Source: {source}")]
  ErrorHandlerFailure {
    #[source]
    source: AnyhowError,
  },

  /// A step, hook or collector panicked during an asynchronous run.
  #[error("Pipeline panicked: {message}")]
  Panicked { message: String },

  #[error("Internal px error: {0}")]
  Internal(String),
}

impl PxError {
  pub(crate) fn precondition(combinator: &str, message: impl Into<String>) -> Self {
    PxError::CompositionPrecondition {
      combinator: combinator.to_string(),
      message: message.into(),
    }
  }

  /// Builds `Panicked` from a payload caught by `catch_unwind`.
  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
      (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
      msg.clone()
    } else {
      "non-string panic payload".to_string()
    };
    PxError::Panicked { message }
  }

  /// Returns the innermost failure, looking through `BranchFailure` wrappers.
  pub fn root_failure(&self) -> &PxError {
    match self {
      PxError::BranchFailure { source, .. } => source.root_failure(),
      other => other,
    }
  }
}

// Steps report failures as anyhow::Error. A step that itself ran a pipeline may
// hand back a PxError wrapped in anyhow, so unwrap it instead of nesting.
impl From<AnyhowError> for PxError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<PxError>() {
      Ok(px_err) => px_err,
      Err(source) => PxError::StepFailure { source },
    }
  }
}

pub type PxResult<T, E = PxError> = std::result::Result<T, E>;
