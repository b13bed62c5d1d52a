//! Fixed-size pool of probe workers.
//!
//! Each worker loops: take a candidate, probe it, record a success, mark the
//! item done. The pool is joined implicitly through queue drainage and torn
//! down explicitly with [`ProbePool::shutdown`].

use super::collector::ResultCollector;
use super::probe::{Candidate, Probe, ProbeOutcome};
use super::queue::WorkQueue;
use futures::FutureExt;
use indicatif::ProgressBar;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// A running set of probe workers bound to one queue/collector pair.
pub struct ProbePool {
    queue: Arc<WorkQueue<Candidate>>,
    workers: Vec<JoinHandle<()>>,
}

impl ProbePool {
    /// Number of workers used when none is configured.
    pub const DEFAULT_WORKERS: usize = 10;

    /// Spawn `worker_count` workers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        worker_count: usize,
        queue: Arc<WorkQueue<Candidate>>,
        collector: Arc<ResultCollector<ProbeOutcome>>,
        probe: Arc<dyn Probe>,
        progress: Option<ProgressBar>,
    ) -> Self {
        let workers = (0..worker_count)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&collector),
                    Arc::clone(&probe),
                    progress.clone(),
                ))
            })
            .collect();

        Self { queue, workers }
    }

    /// Number of workers spawned.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue and cancel every worker, waiting until all have exited.
    pub async fn shutdown(mut self) {
        self.queue.close();
        for handle in self.workers.drain(..) {
            handle.abort();
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!("probe worker ended abnormally: {}", e),
            }
        }
    }
}

impl Drop for ProbePool {
    fn drop(&mut self) {
        // Workers must not outlive the scan that started them
        self.queue.close();
        for handle in &self.workers {
            handle.abort();
        }
    }
}

async fn run_worker(
    id: usize,
    queue: Arc<WorkQueue<Candidate>>,
    collector: Arc<ResultCollector<ProbeOutcome>>,
    probe: Arc<dyn Probe>,
    progress: Option<ProgressBar>,
) {
    while let Some((candidate, ticket)) = queue.take().await {
        let result = AssertUnwindSafe(probe.probe(&candidate))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(outcome)) => {
                debug!(worker = id, url = %outcome.url, "probe succeeded");
                if let Some(ref pb) = progress {
                    pb.set_message(format!("Found: {}", outcome.url));
                }
                collector.append(outcome);
            }
            Ok(Err(e)) => {
                trace!(worker = id, %candidate, error = %e, "probe failed");
            }
            Err(_) => {
                warn!(worker = id, %candidate, "probe panicked, candidate dropped");
            }
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }

        // Acknowledge the item; on unwind the ticket does this by itself
        drop(ticket);
    }

    trace!(worker = id, "queue closed, worker exiting");
}
