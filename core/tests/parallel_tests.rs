// tests/parallel_tests.rs
mod common;

use common::*;
use px::{step, Collector, Pipeline, PipelineOptions, PxError, PxResult, RayonPool, Value};
use std::collections::HashSet;
use std::sync::Arc;

fn rayon_pipeline(threads: usize) -> Pipeline {
  let pool = RayonPool::with_threads(threads).expect("worker pool");
  Pipeline::with_options(PipelineOptions::default().with_pool(pool))
}

#[test]
fn test_parallel_chain_collects_in_declaration_order() -> PxResult<()> {
  setup_tracing();
  // The first-declared branch is the slowest, so completion order is reversed.
  let pipeline = rayon_pipeline(3).parallel_chain([
    slow_expecting("hola", "adios", 60),
    slow_expecting("hola", "listo", 30),
    slow_expecting("hola", "listo2", 0),
  ])?;

  let output = pipeline.execute_sync("hola")?;
  assert_eq!(output, Value::from(vec!["adios", "listo", "listo2"]));
  Ok(())
}

#[test]
fn test_parallel_chain_on_global_pool() -> PxResult<()> {
  setup_tracing();
  let pipeline = Pipeline::new().parallel_chain([
    expecting("hola", "adios"),
    expecting("hola", "listo"),
    expecting("hola", "listo2"),
  ])?;

  assert_eq!(pipeline.execute_sync("hola")?, Value::from(vec!["adios", "listo", "listo2"]));
  Ok(())
}

#[test]
fn test_branches_actually_run_on_worker_threads() -> PxResult<()> {
  setup_tracing();
  let thread_name = || {
    step(|_| {
      let name = std::thread::current().name().unwrap_or("unnamed").to_string();
      Ok(Value::from(name))
    })
  };
  let pipeline = rayon_pipeline(2).parallel_chain([thread_name(), thread_name(), thread_name(), thread_name()])?;

  let output = pipeline.execute_sync(())?;
  let names: HashSet<String> = output
    .as_list()
    .unwrap_or_default()
    .iter()
    .map(ToString::to_string)
    .collect();
  assert!(!names.is_empty());
  assert!(names.iter().all(|n| n.starts_with("px-worker-")), "names: {:?}", names);
  Ok(())
}

#[test]
fn test_parallel_chain_with_joining_collector() -> PxResult<()> {
  setup_tracing();
  let pipeline = inline_pipeline().parallel_chain_with_collector(
    Collector::joining(","),
    [constant("a"), constant("b"), constant("c")],
  )?;

  assert_eq!(pipeline.execute_sync("x")?, Value::from("a,b,c"));
  Ok(())
}

#[test]
fn test_parallel_chain_with_grouping_collector() -> PxResult<()> {
  setup_tracing();
  let by_length = Collector::grouping_by(|v| v.to_string().len().to_string());
  let pipeline = rayon_pipeline(4).parallel_chain_with_collector(
    by_length,
    [constant("uno"), constant("dos"), constant("cuatro"), constant("tres")],
  )?;

  let output = pipeline.execute_sync(())?;
  let groups = output.as_map().cloned().unwrap_or_default();
  assert_eq!(groups.get("3"), Some(&Value::from(vec!["uno", "dos"])));
  assert_eq!(groups.get("6"), Some(&Value::from(vec!["cuatro"])));
  assert_eq!(groups.get("4"), Some(&Value::from(vec!["tres"])));
  Ok(())
}

#[test]
fn test_parallel_chain_with_custom_collector() -> PxResult<()> {
  setup_tracing();
  let sum = Collector::new(|values| {
    let total: i64 = values.iter().filter_map(Value::as_int).sum();
    Ok(Value::from(total))
  });
  let pipeline = inline_pipeline().parallel_chain_with_collector(
    sum,
    [
      step(|v: Value| Ok(Value::from(v.as_int().unwrap_or(0) + 1))),
      step(|v: Value| Ok(Value::from(v.as_int().unwrap_or(0) * 10))),
    ],
  )?;

  assert_eq!(pipeline.execute_sync(2)?, Value::from(23));
  Ok(())
}

#[test]
fn test_fan_out_fails_eagerly_with_earliest_failing_branch() -> PxResult<()> {
  setup_tracing();
  let pipeline = rayon_pipeline(3).parallel_chain([
    slow_expecting("in", "ok", 20),
    failing("second branch broke"),
    failing("third branch broke"),
  ])?;

  match pipeline.execute_sync("in") {
    Err(PxError::BranchFailure { index, source }) => {
      assert_eq!(index, 1);
      assert!(source.to_string().contains("second branch broke"));
    }
    other => panic!("Expected BranchFailure, got {:?}", other),
  }
  Ok(())
}

#[test]
fn test_fan_out_failure_aborts_the_rest_of_the_chain() -> PxResult<()> {
  setup_tracing();
  let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
  let pipeline = inline_pipeline()
    .parallel_chain([constant("fine"), failing("nope")])?
    .chain([counting(counter.clone())])?;

  assert!(pipeline.execute_sync(()).is_err());
  assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
  Ok(())
}

#[test]
fn test_empty_fan_out_is_rejected() {
  setup_tracing();
  assert!(matches!(
    Pipeline::new().parallel_chain(Vec::<px::Step>::new()),
    Err(PxError::CompositionPrecondition { .. })
  ));
  assert!(matches!(
    Pipeline::new().parallel_chain_with_collector(Collector::joining(""), Vec::<px::Step>::new()),
    Err(PxError::CompositionPrecondition { .. })
  ));
}

#[test]
fn test_branch_runs_pipelines_in_parallel_and_orders_results() -> PxResult<()> {
  setup_tracing();
  let first = Pipeline::new().chain([slow_expecting("prueba", "prueba2", 40)])?;
  let second = Pipeline::new().chain([expecting("prueba", "prueba3")])?;

  let pipeline = rayon_pipeline(2)
    .chain([expecting("init", "prueba")])?
    .branch([first, second])?;

  assert_eq!(pipeline.execute_sync("init")?, Value::from(vec!["prueba2", "prueba3"]));
  Ok(())
}

#[test]
fn test_branch_with_collector() -> PxResult<()> {
  setup_tracing();
  let upper = Pipeline::new().chain([step(|v: Value| Ok(Value::from(v.to_string().to_uppercase())))])?;
  let reversed = Pipeline::new().chain([step(|v: Value| Ok(Value::from(v.to_string().chars().rev().collect::<String>())))])?;

  let pipeline = inline_pipeline().branch_with_collector(Collector::joining(" | "), [upper, reversed])?;
  assert_eq!(pipeline.execute_sync("abc")?, Value::from("ABC | cba"));
  Ok(())
}

#[test]
fn test_branch_with_no_pipes_is_rejected() {
  setup_tracing();
  match Pipeline::new().branch(Vec::<Pipeline>::new()) {
    Err(PxError::CompositionPrecondition { combinator, message }) => {
      assert_eq!(combinator, "branch");
      assert!(message.contains("pipe"));
    }
    other => panic!("Expected CompositionPrecondition, got {:?}", other.map(|_| ())),
  }
}

#[test]
fn test_branch_of_empty_pipelines_stringifies_each() -> PxResult<()> {
  setup_tracing();
  let pipeline = inline_pipeline().branch([Pipeline::new(), Pipeline::new()])?;
  assert_eq!(pipeline.execute_sync(7)?, Value::from(vec!["7", "7"]));
  Ok(())
}
