// px/src/core/pool.rs

//! Task submission for asynchronous execution and parallel fan-out.
//!
//! The execution engine never touches threads directly; it goes through a
//! `TaskPool`. `RayonPool` is the default. `InlinePool` runs everything on the
//! calling thread in order, which makes asynchronous execution and fan-out
//! deterministic in tests.

use crate::core::Value;
use crate::error::{PxError, PxResult};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{event, Level};

/// A fire-and-forget unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// One branch of a fan-out.
pub type Job = Box<dyn FnOnce() -> PxResult<Value> + Send + 'static>;

pub trait TaskPool: Send + Sync + 'static {
  /// Short name used in diagnostics.
  fn name(&self) -> &'static str;

  /// Schedules `task` and returns immediately. The task runs to completion;
  /// there is no cancellation.
  fn spawn(&self, task: Task);

  /// Runs every job, blocking until all have finished. The returned results
  /// are in job order, whatever order the jobs completed in.
  fn fan_out(&self, jobs: Vec<Job>) -> Vec<PxResult<Value>>;
}

/// Worker pool backed by rayon: either a dedicated `rayon::ThreadPool` or the
/// rayon global pool.
#[derive(Clone, Default)]
pub struct RayonPool {
  pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonPool {
  /// Uses the rayon global pool.
  pub fn global() -> Self {
    Self { pool: None }
  }

  /// Builds a dedicated pool. `num_threads == 0` lets rayon pick the size.
  pub fn with_threads(num_threads: usize) -> PxResult<Self> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .thread_name(|idx| format!("px-worker-{}", idx))
      .build()
      .map_err(|e| PxError::Internal(format!("Failed to build worker pool: {}", e)))?;
    event!(Level::DEBUG, num_threads = pool.current_num_threads(), "Dedicated worker pool built.");
    Ok(Self {
      pool: Some(Arc::new(pool)),
    })
  }

  pub fn num_threads(&self) -> usize {
    match &self.pool {
      Some(pool) => pool.current_num_threads(),
      None => rayon::current_num_threads(),
    }
  }
}

impl TaskPool for RayonPool {
  fn name(&self) -> &'static str {
    if self.pool.is_some() {
      "rayon-dedicated"
    } else {
      "rayon-global"
    }
  }

  fn spawn(&self, task: Task) {
    match &self.pool {
      Some(pool) => pool.spawn(task),
      None => rayon::spawn(task),
    }
  }

  fn fan_out(&self, jobs: Vec<Job>) -> Vec<PxResult<Value>> {
    // Indexed parallel iterators collect in input order.
    let run = move || jobs.into_par_iter().map(|job| job()).collect::<Vec<_>>();
    match &self.pool {
      Some(pool) => pool.install(run),
      None => run(),
    }
  }
}

impl std::fmt::Debug for RayonPool {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RayonPool")
      .field("name", &self.name())
      .field("num_threads", &self.num_threads())
      .finish()
  }
}

/// Runs tasks and fan-out jobs immediately on the calling thread, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePool;

impl TaskPool for InlinePool {
  fn name(&self) -> &'static str {
    "inline"
  }

  fn spawn(&self, task: Task) {
    task()
  }

  fn fan_out(&self, jobs: Vec<Job>) -> Vec<PxResult<Value>> {
    jobs.into_iter().map(|job| job()).collect()
  }
}
