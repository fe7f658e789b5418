pub mod collector;
pub mod hooks;
pub mod pool;
pub mod step;
pub mod value;

// Re-export key types for easier access from other px modules (and lib.rs)
pub use collector::Collector;
pub use hooks::{hook, Hook, HookRegistry};
pub use pool::{InlinePool, RayonPool, TaskPool};
pub use step::{step, Predicate, Step};
pub use value::Value;
