// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use parking_lot::Mutex;
use px::{hook, step, Hook, InlinePool, Pipeline, PipelineOptions, PxError, Step, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Common Step Creators ---

/// A step that ignores its input and returns `out`.
pub fn constant(out: &'static str) -> Step {
  Step::named(out, move |_| Ok(Value::from(out)))
}

/// A step that fails unless its input is `expected`, then returns `out`.
pub fn expecting(expected: &'static str, out: &'static str) -> Step {
  Step::named(format!("{}->{}", expected, out), move |input: Value| {
    if input != expected {
      anyhow::bail!("expected input '{}', got '{}'", expected, input);
    }
    Ok(Value::from(out))
  })
}

/// Like `expecting`, but sleeps first so later declarations can finish earlier.
pub fn slow_expecting(expected: &'static str, out: &'static str, delay_ms: u64) -> Step {
  step(move |input: Value| {
    std::thread::sleep(Duration::from_millis(delay_ms));
    if input != expected {
      anyhow::bail!("expected input '{}', got '{}'", expected, input);
    }
    Ok(Value::from(out))
  })
}

pub fn failing(message: &'static str) -> Step {
  Step::named("failing", move |_| Err(anyhow::anyhow!(message)))
}

/// A step that bumps `counter` and passes its input through.
pub fn counting(counter: Arc<AtomicUsize>) -> Step {
  step(move |input| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(input)
  })
}

/// A root pipeline whose async runs and fan-outs happen in place, in order.
pub fn inline_pipeline() -> Pipeline {
  Pipeline::with_options(PipelineOptions::default().with_pool(InlinePool))
}

// --- Recording hooks ---

#[derive(Clone, Default)]
pub struct Recorder {
  entries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
  pub fn new() -> Self {
    Self::default()
  }

  /// A hook that records `"<label>:<value>"`.
  pub fn hook(&self, label: &'static str) -> Hook {
    let entries = self.entries.clone();
    hook(move |value| entries.lock().push(format!("{}:{}", label, value)))
  }

  pub fn push(&self, entry: String) {
    self.entries.lock().push(entry);
  }

  pub fn entries(&self) -> Vec<String> {
    self.entries.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }
}

/// Debug sink that records what `debug_enabled_with` reports.
#[derive(Clone, Default)]
pub struct RecordingSink {
  pub recorder: Recorder,
}

impl px::DebugSink for RecordingSink {
  fn step_started(&self, input: &Value) {
    self.recorder.push(format!("started:{}", input));
  }

  fn step_finished(&self, output: &Value) {
    self.recorder.push(format!("finished:{}", output));
  }

  fn failed(&self, failure: &PxError) {
    self.recorder.push(format!("failed:{}", failure.root_failure()));
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Capturing log output ---

/// In-memory writer for a scoped `fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

impl LogBuffer {
  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock()).into_owned()
  }
}

/// Runs `f` with a thread-local subscriber that keeps events at `max_level`
/// and above, and returns what it wrote.
pub fn capture_logs<R>(max_level: Level, f: impl FnOnce() -> R) -> (R, String) {
  let buffer = LogBuffer::default();
  let writer = buffer.clone();
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(max_level)
    .with_ansi(false)
    .with_writer(move || writer.clone())
    .finish();
  let result = tracing::subscriber::with_default(subscriber, f);
  (result, buffer.contents())
}

// --- Atomic counters for checking execution counts ---
pub static ERROR_HANDLER_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static RESULT_CALLBACK_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  ERROR_HANDLER_COUNTER.store(0, Ordering::SeqCst);
  RESULT_CALLBACK_COUNTER.store(0, Ordering::SeqCst);
}

/// Waits up to five seconds for a value sent by an async callback.
pub fn recv<T>(rx: &std::sync::mpsc::Receiver<T>) -> T {
  rx.recv_timeout(Duration::from_secs(5))
    .expect("async pipeline did not report within 5s")
}
