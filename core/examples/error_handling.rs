// px/examples/error_handling.rs

use px::{step, ErrorPolicy, Pipeline, PipelineOptions, PxError, Value};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("The async run never reported back")]
  Timeout,

  #[error("px error during pipeline execution: {0}")]
  Pipeline(#[from] PxError), // Allows PxError to be converted into ExampleAppError
}

fn main() -> Result<(), ExampleAppError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  // Scenario 1: synchronous runs hand the failure straight back.
  info!("\nScenario 1: execute_sync propagates the step failure");
  run_sync_failure()?;

  // Scenario 2: asynchronous runs report to the error handler.
  info!("\nScenario 2: execute_async routes the failure to subscribe_error");
  run_async_failure()?;

  // Scenario 3: without a handler, failed async runs vanish unless the
  // pipeline was built with a logging policy.
  info!("\nScenario 3: ErrorPolicy::LogAndDrop");
  let logged = Pipeline::with_options(PipelineOptions::default().with_error_policy(ErrorPolicy::LogAndDrop))
    .then(step(|_| Err(anyhow::anyhow!("nobody is listening"))));
  logged.execute_async(());
  std::thread::sleep(Duration::from_millis(50));

  Ok(())
}

fn steps_with_failure() -> Result<Pipeline, ExampleAppError> {
  let pipeline = Pipeline::new().chain([
    step(|input: Value| {
      info!("Executing step_one");
      Ok(Value::from(format!("{}+one", input)))
    }),
    step(|input: Value| {
      info!("Executing step_two_fails - this will error");
      anyhow::bail!("Something went wrong in step_two after '{}'", input)
    }),
    step(|input: Value| {
      error!("Executing step_three (should not be reached)");
      Ok(input)
    }),
  ])?;
  Ok(pipeline)
}

fn run_sync_failure() -> Result<(), ExampleAppError> {
  match steps_with_failure()?.execute_sync("start") {
    Ok(output) => error!("Pipeline unexpectedly succeeded: {}", output),
    Err(e) => {
      info!("Pipeline failed as expected: {}", e);
      assert!(matches!(e, PxError::StepFailure { .. }));
    }
  }
  Ok(())
}

fn run_async_failure() -> Result<(), ExampleAppError> {
  let (tx, rx) = mpsc::channel();
  let pipeline = steps_with_failure()?
    .subscribe_result(|output| error!("Result callback unexpectedly called with {}", output))
    .subscribe_error(move |failure| {
      info!("Error handler received: {}", failure);
      tx.send(failure.to_string())?;
      Ok(())
    });

  pipeline.execute_async("start");
  let reported = rx.recv_timeout(Duration::from_secs(5)).map_err(|_| ExampleAppError::Timeout)?;
  assert!(reported.contains("step_two"));
  Ok(())
}
