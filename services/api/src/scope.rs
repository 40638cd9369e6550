//! Cancellable view tasks
//!
//! A [`ViewScope`] owns the fetches a view starts. When the view goes away the
//! scope is dropped and every unfinished fetch is aborted, so a late answer can
//! never write into state the user has already left.

use std::future::Future;

use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::debug;

pub struct ViewScope {
    name: &'static str,
    tasks: JoinSet<()>,
}

impl ViewScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: JoinSet::new(),
        }
    }

    /// Run `task` inside the scope; the receiver yields its output
    ///
    /// The receiver errors if the scope is closed before the task finished.
    pub fn spawn<F, T>(&mut self, task: F) -> oneshot::Receiver<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.tasks.spawn(async move {
            let output = task.await;
            // Nobody listening means the view stopped caring
            let _ = tx.send(output);
        });
        rx
    }

    /// Tasks spawned and not yet reaped
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Abort everything still running
    pub fn close(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        if !self.tasks.is_empty() {
            debug!("Closing view {} with {} task(s)", self.name, self.tasks.len());
        }
        self.tasks.abort_all();
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_finished_task_delivers_output() {
        let mut scope = ViewScope::new("dashboard");
        let rx = scope.spawn(async { 42 });
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_closing_discards_late_results() {
        let written = Arc::new(AtomicBool::new(false));
        let mut scope = ViewScope::new("dashboard");

        let flag = written.clone();
        let rx = scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(scope.len(), 1);

        scope.close();
        assert!(rx.await.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!written.load(Ordering::SeqCst));
    }
}
