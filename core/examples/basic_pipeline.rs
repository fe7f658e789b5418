// px/examples/basic_pipeline.rs

use px::{hook, step, Pipeline, PxResult, Step, Value};
use tracing::info;

// 1. Define the steps. Each one maps a `Value` to a new `Value`.
fn add(n: i64) -> Step {
  Step::named(format!("add_{}", n), move |input: Value| {
    let current = input.as_int().unwrap_or(0);
    Ok(Value::from(current + n))
  })
}

fn double() -> Step {
  step(|input: Value| Ok(Value::from(input.as_int().unwrap_or(0) * 2)))
}

fn main() -> PxResult<()> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 2. Build the pipeline. Every combinator returns a new pipeline; `base` is
  //    still usable afterwards.
  let base = Pipeline::new().chain([add(1), double()])?;
  let pipeline = base.chain([add(-1)])?;

  // 3. Observe every step boundary.
  let pipeline = pipeline
    .subscribe_before([hook(|input| info!("-> step input: {}", input))])
    .subscribe_after([hook(|output| info!("<- step output: {}", output))]);

  // 4. Run it synchronously.
  info!("Starting pipeline execution...");
  let output = pipeline.execute_sync(5)?;

  // Expected: (5+1)*2 - 1 = 11
  info!("Final value: {}", output);
  assert_eq!(output, Value::from(11));

  // The hooks live on a registry shared by the whole tree, so `base` is
  // observed too.
  assert_eq!(base.execute_sync(5)?, Value::from(12));

  // 5. An empty pipeline hands back the input's display form.
  assert_eq!(Pipeline::new().execute_sync(vec![1, 2])?, Value::from("[1, 2]"));

  Ok(())
}
