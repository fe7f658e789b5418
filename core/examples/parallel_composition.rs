// px/examples/parallel_composition.rs

use px::{step, Collector, Pipeline, PipelineOptions, PxResult, RayonPool, Value};
use std::time::Duration;
use tracing::info;

fn main() -> PxResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Parallel & Composition Example ---");

  let options = PipelineOptions::default().with_pool(RayonPool::with_threads(4)?);
  let root = Pipeline::with_options(options).debug_enabled();

  // 1. Fan out: every branch sees the same input. The slowest branch is
  //    declared first, yet the results still come back in declaration order.
  let lookups = root.parallel_chain([
    slow_lookup("inventory", 80),
    slow_lookup("pricing", 40),
    slow_lookup("reviews", 0),
  ])?;
  let output = lookups.execute_sync("sku-42")?;
  info!("Fan-out result: {}", output);
  assert_eq!(output, Value::from(vec!["inventory:sku-42", "pricing:sku-42", "reviews:sku-42"]));

  // 2. A collector folds the branch outputs into something else.
  let summary = root.parallel_chain_with_collector(
    Collector::joining("; "),
    [slow_lookup("inventory", 0), slow_lookup("pricing", 0)],
  )?;
  info!("Joined result: {}", summary.execute_sync("sku-7")?);

  // 3. Gate work on a predicate. Inputs that fail it pass straight through.
  let normalize = root
    .conditional_chain(|v| v.as_str().is_some_and(|s| s.starts_with(' ')), [step(|v: Value| {
      Ok(Value::from(v.to_string().trim().to_string()))
    })])
    .conditional_branch(
      |v| v.as_str().is_some_and(|s| s.starts_with("sku-")),
      lookups.clone(),
      Pipeline::new().chain([step(|v: Value| Ok(Value::from(format!("unknown:{}", v))))])?,
    );
  info!("Normalized known: {}", normalize.execute_sync("  sku-1")?);
  info!("Normalized unknown: {}", normalize.execute_sync("abc")?);

  // 4. Pipe-to-pipe composition.
  let shout = Pipeline::new().chain([step(|v: Value| Ok(Value::from(v.to_string().to_uppercase())))])?;
  let exclaim = Pipeline::new().chain([step(|v: Value| Ok(Value::from(format!("{}!", v))))])?;

  let both = Pipeline::new().concat([shout.clone(), exclaim.clone()])?;
  let composed = exclaim.compose(shout.clone());
  let then = shout.and_then(exclaim);
  for pipeline in [both, composed, then] {
    assert_eq!(pipeline.execute_sync("hola")?, Value::from("HOLA!"));
  }

  // 5. Whole pipelines can be fanned out too.
  let branched = root.branch([normalize, summary])?;
  info!("Branched result: {}", branched.execute_sync("sku-9")?);

  Ok(())
}

fn slow_lookup(source: &'static str, delay_ms: u64) -> px::Step {
  px::Step::named(source, move |input: Value| {
    std::thread::sleep(Duration::from_millis(delay_ms));
    Ok(Value::from(format!("{}:{}", source, input)))
  })
}
