//! Fan-out/join task group.
//!
//! Both schema initialization and record saving issue an unbounded set of
//! independent tasks and need a single aggregated completion: success once
//! every task settles, or the first error. [`FanOut`] is that join point,
//! expressed as structured concurrency over [`tokio::task::JoinSet`].

use crate::error::AdapterResult;
use std::future::Future;
use tokio::task::JoinSet;

/// A group of independent tasks joined by a single completion.
///
/// Tasks are spawned with [`FanOut::spawn`] and run concurrently in any
/// order. [`FanOut::join`] consumes the group and resolves exactly once:
///
/// - with `Ok` holding every task's output once all tasks settle, or
/// - with the **first** error any task reports, in which case the
///   remaining tasks are aborted and their outcomes discarded.
///
/// A group that never spawned a task joins immediately with an empty
/// output - the zero-task case completes instead of hanging.
///
/// Completion outputs carry no ordering guarantee.
pub struct FanOut<T> {
    tasks: JoinSet<AdapterResult<T>>,
}

impl<T: Send + 'static> FanOut<T> {
    /// Creates an empty task group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Registers one task with the group.
    ///
    /// The task starts running immediately; it does not wait for `join`.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = AdapterResult<T>> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Returns the number of tasks registered with the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no task was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for the group to settle.
    ///
    /// First error wins: as soon as any task reports an error, the
    /// remaining tasks are aborted and that error is returned. Outcomes
    /// of tasks settling after the first error are discarded.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by any task.
    ///
    /// # Panics
    ///
    /// Propagates a panic from any task.
    pub async fn join(mut self) -> AdapterResult<Vec<T>> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        while let Some(settled) = self.tasks.join_next().await {
            match settled {
                Ok(Ok(output)) => outputs.push(output),
                Ok(Err(err)) => {
                    self.tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        continue;
                    }
                    std::panic::resume_unwind(join_err.into_panic());
                }
            }
        }
        Ok(outputs)
    }
}

impl<T: Send + 'static> Default for FanOut<T> {
    fn default() -> Self {
        Self::new()
    }
}
