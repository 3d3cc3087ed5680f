//! Search input debouncing
//!
//! Each call to [`SearchDebouncer::schedule`] cancels the previously pending
//! task and starts a new quiet-interval timer. Only a task whose timer runs
//! out without being replaced gets to execute.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiet interval before a search term is acted on
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(400);

/// Cancels and reschedules a single pending task
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// Run `task` after the quiet interval unless another task is scheduled first
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            task.await;
        });

        let previous = self.lock_pending().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancel whatever is pending without scheduling anything new
    pub fn cancel(&self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }

    /// Wait for the currently pending task, if any, to finish or be cancelled
    pub async fn settle(&self) {
        let handle = self.lock_pending().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Debounced task did not complete");
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        // The guarded value is a plain handle; a poisoned lock still holds a valid one.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
