//! `WorkerPool`: bounded-parallelism executor for the per-page
//! pipeline.
//!
//! A `tokio::sync::Semaphore` caps width, and an `AtomicUsize` tracks
//! in-flight tasks so `has_running_work` needs no lock. Panics inside a
//! task are caught so one bad page can never take down the pool.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::error;

/// Accepts no-argument async tasks and runs up to `N` concurrently.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    shutting_down: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit `task`. Blocks the caller until a slot is free. A task
    /// that panics is caught and logged; its slot is released exactly
    /// as if it had returned normally.
    pub async fn do_work<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.shutting_down.load(Ordering::SeqCst) {
            error!("do_work called after shutdown; task dropped");
            return;
        }

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("semaphore is never closed while the pool is alive");

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let _permit = permit;
            if let Err(panic) = std::panic::AssertUnwindSafe(task).catch_unwind().await {
                error!(?panic, "worker task panicked");
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// True iff at least one submitted task has not yet completed.
    pub fn has_running_work(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Wait for all in-flight tasks to finish, then reject further
    /// `do_work` calls.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        while self.has_running_work() {
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
    }
}
