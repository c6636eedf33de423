//! Cancellable delayed callbacks on the tokio runtime.

use std::time::Duration;

use tokio::task::AbortHandle;

/// Delayed callbacks owned by one session.
///
/// Every callback runs on its own spawned task after a `tokio::time::sleep`.
/// Dropping the set, or calling [`TimerSet::cancel_all`], aborts every
/// callback that has not fired yet. Must be used inside a tokio runtime.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: Vec<AbortHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` once after `delay`.
    pub fn schedule<F>(&mut self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handles.retain(|h| !h.is_finished());
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });
        self.handles.push(task.abort_handle());
    }

    /// Abort every callback that has not fired yet.
    pub fn cancel_all(&mut self) {
        let pending = self.pending();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        if pending > 0 {
            tracing::debug!(pending, "cancelled timers");
        }
    }

    /// Callbacks scheduled but not yet finished.
    pub fn pending(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
