// px/src/core/hooks.rs

//! Defines `Hook` and the shared, append-only `HookRegistry`.
//!
//! A registry is created once per pipeline tree and handed by reference to every
//! pipeline derived from it, so a hook subscribed on any derived pipeline also
//! fires for the root and for every sibling.

use super::Value;
use parking_lot::RwLock;
use std::sync::Arc;

/// A side-effect-only observer of a value flowing past a step boundary.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn(&Value) + Send + Sync + 'static>);

impl Hook {
  pub fn new(func: impl Fn(&Value) + Send + Sync + 'static) -> Self {
    Hook(Arc::new(func))
  }

  pub(crate) fn call(&self, value: &Value) {
    (self.0)(value)
  }
}

/// Shorthand for [`Hook::new`].
pub fn hook(func: impl Fn(&Value) + Send + Sync + 'static) -> Hook {
  Hook::new(func)
}

impl std::fmt::Debug for Hook {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Hook(..)")
  }
}

/// Ordered list of hooks behind a shared handle.
///
/// Cloning the registry clones the handle, not the list. The list itself is an
/// immutable `Arc<[Hook]>` replaced wholesale on every append, so notifying
/// only bumps a reference count and never holds the lock while hooks run. A
/// hook added mid-run fires from the next tap onward.
#[derive(Clone)]
pub struct HookRegistry {
  hooks: Arc<RwLock<Arc<[Hook]>>>,
}

impl HookRegistry {
  pub fn new() -> Self {
    Self {
      hooks: Arc::new(RwLock::new(Arc::from(Vec::new()))),
    }
  }

  pub fn append<I>(&self, hooks: I)
  where
    I: IntoIterator<Item = Hook>,
  {
    let mut current = self.hooks.write();
    let mut next: Vec<Hook> = current.iter().cloned().collect();
    next.extend(hooks);
    *current = Arc::from(next);
  }

  pub fn len(&self) -> usize {
    self.hooks.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.hooks.read().is_empty()
  }

  /// True if both handles point at the same underlying list.
  pub fn ptr_eq(&self, other: &HookRegistry) -> bool {
    Arc::ptr_eq(&self.hooks, &other.hooks)
  }

  /// The current list. Later appends do not change a snapshot already taken.
  pub(crate) fn snapshot(&self) -> Arc<[Hook]> {
    self.hooks.read().clone()
  }

  /// Calls every hook, in registration order, with `value`.
  pub(crate) fn notify(&self, value: &Value) {
    let snapshot = self.snapshot();
    for hook in snapshot.iter() {
      hook.call(value);
    }
  }
}

impl Default for HookRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for HookRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HookRegistry").field("len", &self.len()).finish()
  }
}
