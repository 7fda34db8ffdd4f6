//! Cancellable deferred tasks keyed by owner id

use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, error};

type TaskTable = HashMap<String, Vec<(u64, AbortHandle)>>;

/// Delayed tasks grouped by key, cancellable as a group.
///
/// Runs on tokio timers, so tests can drive it with a paused clock.
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    tasks: Arc<Mutex<TaskTable>>,
    next_id: Arc<AtomicU64>,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` unless `key` is cancelled first
    pub fn schedule<F>(&self, key: impl Into<String>, delay: Duration, task: F) -> u64
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = self.tasks.clone();
        let task_key = key.clone();

        // Hold the table lock until the handle is registered so a zero-delay
        // task cannot deregister before it is inserted
        let mut table = self.tasks.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deregister(&tasks, &task_key, id);

            if AssertUnwindSafe(task).catch_unwind().await.is_err() {
                error!(key = %task_key, "Deferred task panicked");
            }
        });
        table
            .entry(key)
            .or_default()
            .push((id, handle.abort_handle()));

        id
    }

    /// Abort every pending task of `key`; returns how many were pending
    pub fn cancel(&self, key: &str) -> usize {
        let removed = self.tasks.lock().remove(key).unwrap_or_default();
        for (_, handle) in &removed {
            handle.abort();
        }
        if !removed.is_empty() {
            debug!(key, count = removed.len(), "Cancelled deferred tasks");
        }
        removed.len()
    }

    /// Abort everything
    pub fn cancel_all(&self) -> usize {
        let table = std::mem::take(&mut *self.tasks.lock());
        let mut count = 0;
        for handle in table.into_values().flatten().map(|(_, h)| h) {
            handle.abort();
            count += 1;
        }
        count
    }

    /// Number of tasks of `key` still waiting to fire
    pub fn pending(&self, key: &str) -> usize {
        self.tasks.lock().get(key).map_or(0, Vec::len)
    }

    pub fn total_pending(&self) -> usize {
        self.tasks.lock().values().map(Vec::len).sum()
    }
}

fn deregister(tasks: &Mutex<TaskTable>, key: &str, id: u64) {
    let mut table = tasks.lock();
    if let Some(entries) = table.get_mut(key) {
        entries.retain(|(entry_id, _)| *entry_id != id);
        if entries.is_empty() {
            table.remove(key);
        }
    }
}
