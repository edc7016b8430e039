use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::sleep;

type TaskMap = Arc<Mutex<HashMap<u64, AbortHandle>>>;

/// Runs futures after a delay on the tokio runtime.
#[derive(Clone, Default)]
pub struct Scheduler {
    tasks: TaskMap,
    next_id: Arc<AtomicU64>,
}

pub struct ScheduledTask {
    id: u64,
    tasks: TaskMap,
}

/// Drops the task's entry however the task ends: completion, panic or abort.
struct Completion {
    id: u64,
    tasks: TaskMap,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.id);
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let completion = Completion {
            id,
            tasks: self.tasks.clone(),
        };

        // Held until the handle is stored so the task can't finish first and leave a stale entry.
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);

        let handle = tokio::spawn(async move {
            let _completion = completion;
            sleep(delay).await;
            task.await;
        });

        pending.insert(id, handle.abort_handle());

        ScheduledTask {
            id,
            tasks: self.tasks.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn shutdown(&self) {
        let handles: Vec<AbortHandle> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.drain().map(|(_, handle)| handle).collect()
        };

        for handle in handles {
            handle.abort();
        }
    }
}

impl ScheduledTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns false when the task already ran or was cancelled.
    pub fn cancel(&self) -> bool {
        let removed = self.tasks.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.id);

        match removed {
            Some(handle) => {
                handle.abort();
                true
            },
            None => false,
        }
    }
}
