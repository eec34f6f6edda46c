//! The reporting sink contract and its stock implementations.
//!
//! # Design
//! The engine never decides how a mismatch is presented; it hands messages to
//! an injected [`Reporter`]. Three operations cover the three tiers: `error`
//! for accumulable mismatches, `fatal` for structural violations that abandon
//! the current exchange, and `cleanup` to register the run-once end-of-test
//! completeness check. [`RecordingReporter`] is the buffering test double;
//! [`NoopReporter`] backs pass-through harnesses.

use std::mem;
use std::sync::{Arc, Mutex};

/// The sink receiving mismatch reports, fatal aborts, and deferred checks.
///
/// Implementations must be safe to call from multiple invocation threads.
pub trait Reporter: Send + Sync {
    /// Report a non-fatal, accumulable mismatch.
    fn error(&self, message: String);

    /// Report a structural violation aborting the current exchange.
    fn fatal(&self, message: String);

    /// Register a hook to run once at test end.
    fn cleanup(&self, hook: Box<dyn FnOnce() + Send>);
}

/// A sink that ignores everything, including cleanup hooks.
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn error(&self, _: String) {}

    fn fatal(&self, _: String) {}

    fn cleanup(&self, _: Box<dyn FnOnce() + Send>) {}
}

/// Wrap a sink so every per-invocation message carries the 1-based invocation
/// number as a `"{number} call, "` prefix. Cleanup hooks pass through
/// unprefixed.
pub fn with_call_number(reporter: Arc<dyn Reporter>, number: u64) -> Arc<dyn Reporter> {
    Arc::new(CallNumberReporter {
        prefix: format!("{number} call, "),
        inner: reporter,
    })
}

struct CallNumberReporter {
    prefix: String,
    inner: Arc<dyn Reporter>,
}

impl Reporter for CallNumberReporter {
    fn error(&self, message: String) {
        self.inner.error(format!("{}{message}", self.prefix));
    }

    fn fatal(&self, message: String) {
        self.inner.fatal(format!("{}{message}", self.prefix));
    }

    fn cleanup(&self, hook: Box<dyn FnOnce() + Send>) {
        self.inner.cleanup(hook);
    }
}

/// A buffering sink for test doubles: records every message and runs the
/// registered cleanup hooks when [`RecordingReporter::finish`] is called.
///
/// Buffers are mutex-guarded since concurrent invocations report in parallel.
#[derive(Default)]
pub struct RecordingReporter {
    errors: Mutex<Vec<String>>,
    fatals: Mutex<Vec<String>>,
    hooks: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded error messages, in report order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("lock poisoned").clone()
    }

    /// Snapshot of the recorded fatal messages, in report order.
    pub fn fatals(&self) -> Vec<String> {
        self.fatals.lock().expect("lock poisoned").clone()
    }

    /// Run the registered cleanup hooks.
    ///
    /// Call exactly once, after the last exchange; the harness must not be
    /// used afterwards. Hooks are drained before running, so a second call
    /// does nothing.
    pub fn finish(&self) {
        let hooks = mem::take(&mut *self.hooks.lock().expect("lock poisoned"));

        for hook in hooks {
            hook();
        }
    }
}

impl Reporter for RecordingReporter {
    fn error(&self, message: String) {
        self.errors.lock().expect("lock poisoned").push(message);
    }

    fn fatal(&self, message: String) {
        self.fatals.lock().expect("lock poisoned").push(message);
    }

    fn cleanup(&self, hook: Box<dyn FnOnce() + Send>) {
        self.hooks.lock().expect("lock poisoned").push(hook);
    }
}
