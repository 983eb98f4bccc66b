//! Detached side effects.
//!
//! Notifications and analytics run outside the request that triggered
//! them. [`BackgroundTasks`] spawns them on the runtime, logs their failures
//! (the only place those failures are ever observed), and keeps the handles
//! so a shutdown can wait for in-flight work.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;

/// Tracked set of fire-and-forget tasks.
///
/// Cloning is cheap; clones share the same task set.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    /// Creates an empty task set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` without waiting for it. An `Err` outcome is logged
    /// with `label` and otherwise dropped.
    pub fn spawn<F, E>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let wrapped = async move {
            match task.await {
                Ok(()) => tracing::debug!(task = label, "background task finished"),
                Err(e) => tracing::error!(task = label, error = %e, "background task failed"),
            }
        };

        let Ok(mut set) = self.tasks.lock() else {
            // Poisoned only if a previous holder panicked; run untracked.
            tokio::spawn(wrapped);
            return;
        };
        while set.try_join_next().is_some() {}
        set.spawn(wrapped);
    }

    /// Number of tasks spawned and not yet reaped.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|set| set.len()).unwrap_or(0)
    }

    /// Waits until every task spawned so far has finished, including tasks
    /// those tasks spawn in turn.
    pub async fn drain(&self) {
        loop {
            let mut set = match self.tasks.lock() {
                Ok(mut guard) => std::mem::take(&mut *guard),
                Err(_) => return,
            };
            if set.is_empty() {
                return;
            }
            while let Some(result) = set.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "background task aborted");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn drain_waits_for_spawned_tasks() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = Arc::clone(&done);
            tasks.spawn("count", async move {
                tokio::task::yield_now().await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            });
        }

        tasks.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn failures_do_not_escape() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("fails", async { Err::<(), _>("smtp down") });
        tasks.drain().await;
        assert_eq!(tasks.pending(), 0);
    }
}
