//! Publish job serialization
//!
//! Two publish jobs racing to advance the same hosting branch would
//! silently clobber each other, so the queue enforces process-wide mutual
//! exclusion: one job runs, the rest wait their turn in arrival order.
//! The lock is global rather than keyed by repository, which also
//! serializes unrelated publishes. Nothing is persisted; jobs still
//! waiting when the process exits are gone.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use uuid::Uuid;

/// FIFO gate that lets one publish job run at a time
#[derive(Default)]
pub struct PublishJobQueue {
    // tokio's Mutex queues waiters fairly, which is what makes the
    // FIFO guarantee hold
    gate: Mutex<()>,
    waiting: AtomicUsize,
}

impl PublishJobQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs currently waiting for the gate
    pub fn pending(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Run a publish job once the gate is free
    ///
    /// Jobs submitted while another runs are parked in arrival order.
    /// The job's output is handed back to the submitter unchanged.
    pub async fn run<F, Fut, T>(&self, job: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let job_id = Uuid::new_v4();
        let queued_behind = self.waiting.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%job_id, queued_behind, "publish job queued");

        let _guard = self.gate.lock().await;
        self.waiting.fetch_sub(1, Ordering::SeqCst);
        tracing::info!(%job_id, "publish job started");

        let output = job().await;

        tracing::info!(%job_id, "publish job finished");
        output
    }
}
