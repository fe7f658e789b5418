// src/lib.rs

//! px: declarative, composable pipelines for Rust.
//!
//! A `Pipeline` is an immutable value built up through combinators:
//!  - Sequential chaining of steps (`chain`, `then`).
//!  - Parallel fan-out with results assembled in declaration order
//!    (`parallel_chain`, `branch`), or folded by a custom `Collector`.
//!  - Predicate-gated branching (`conditional_chain`, `conditional_pipe`,
//!    `conditional_branch`).
//!  - Pipe-to-pipe composition (`concat`, `and_then`, `compose`).
//!  - Before/after hooks fired around every chained step, shared across every
//!    pipeline derived from the same root.
//!  - Synchronous execution (`execute_sync`) that returns the output or the
//!    failure, and fire-and-forget execution (`execute_async`) that reports
//!    through a result callback and an error handler.

pub mod conditional;
pub mod core;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

// Values, steps and hooks that users will interact with frequently
pub use crate::core::collector::Collector;
pub use crate::core::hooks::{hook, Hook, HookRegistry};
pub use crate::core::pool::{InlinePool, RayonPool, TaskPool};
pub use crate::core::step::{step, Predicate, Step};
pub use crate::core::value::Value;

// The main Pipeline struct and its configuration
pub use crate::pipeline::definition::{ErrorPolicy, Pipeline, PipelineOptions};
pub use crate::pipeline::hooks::{DebugSink, TracingSink};

pub use crate::error::{PxError, PxResult};

/*
    Core Workflow:
    1. Create a root `Pipeline::new()` (or `Pipeline::with_options(...)` to pick
       the pool and the default error policy).
    2. Add steps with `.chain([step(...), ...])?`, fan out with
       `.parallel_chain(...)?` or `.branch(...)?`, gate with
       `.conditional_chain(...)`, and splice in other pipelines with
       `.and_then(...)`, `.concat(...)?` or `.compose(...)`.
    3. Observe with `.subscribe_before([...])` / `.subscribe_after([...])`, or
       `.debug_enabled()`.
    4. Run with `.execute_sync(input)?`, or register `.subscribe_result(...)` and
       `.subscribe_error(...)` and call `.execute_async(input)`.
*/
