//! Background action tracking.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Counts spawned action tasks so shutdown and tests can wait for them.
#[derive(Debug, Clone)]
pub(crate) struct InFlight {
    count: Arc<watch::Sender<usize>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Spawn `task` on the runtime and count it until it finishes.
    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.count.send_modify(|c| *c = c.saturating_add(1));
        let done = Done {
            count: Arc::clone(&self.count),
        };
        tokio::spawn(async move {
            let _done = done;
            task.await;
        });
    }

    pub(crate) fn pending(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolve once no task is running.
    pub(crate) async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|c| *c == 0).await;
    }
}

/// Decrements the counter even if the task panics.
struct Done {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for Done {
    fn drop(&mut self) {
        self.count.send_modify(|c| *c = c.saturating_sub(1));
    }
}
