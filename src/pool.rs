//! Bounded producer/worker pipeline used by parallel sweeps
//!
//! One producer walks the root on tokio's blocking pool and feeds a bounded
//! channel; a fixed set of workers drain it and delete expired files. A full
//! channel suspends the producer, which is the only backpressure in the
//! pipeline.

use crate::aggregate::ErrorAggregator;
use crate::error::SweepError;
use crate::walker::{walk_candidates, FileTask, SessionMatcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Counters accumulated by the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Matching files handed to a worker
    pub evaluated: usize,
    /// Files deleted
    pub removed: usize,
    /// Files younger than the retention threshold
    pub retained: usize,
    /// Files whose deletion failed
    pub failed: usize,
}

impl PoolStats {
    pub fn merge(&mut self, other: &PoolStats) {
        self.evaluated += other.evaluated;
        self.removed += other.removed;
        self.retained += other.retained;
        self.failed += other.failed;
    }
}

/// Fixed-size pool of deletion workers
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    retention: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, retention: Duration) -> Self {
        Self {
            workers: workers.max(1),
            retention,
        }
    }

    /// Drain `rx` until it is closed and empty, then return combined stats
    ///
    /// Each task is received by exactly one worker. Deletion failures are
    /// logged and recorded in `errors`; they never stop the pool.
    pub async fn run(&self, rx: mpsc::Receiver<FileTask>, errors: ErrorAggregator) -> PoolStats {
        let rx = Arc::new(Mutex::new(rx));

        let handles: Vec<JoinHandle<PoolStats>> = (0..self.workers)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let errors = errors.clone();
                let retention = self.retention;
                tokio::spawn(async move { run_worker(worker_id, rx, retention, errors).await })
            })
            .collect();

        let mut stats = PoolStats::default();
        for handle in handles {
            match handle.await {
                Ok(worker_stats) => stats.merge(&worker_stats),
                Err(e) => {
                    warn!("Deletion worker did not complete: {}", e);
                    errors.record(SweepError::TaskJoin(e));
                }
            }
        }
        stats
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<FileTask>>>,
    retention: Duration,
    errors: ErrorAggregator,
) -> PoolStats {
    let mut stats = PoolStats::default();

    loop {
        // The lock is only held while waiting for the next item
        let task = rx.lock().await.recv().await;
        let Some(task) = task else {
            break;
        };

        stats.evaluated += 1;
        if !task.is_expired(SystemTime::now(), retention) {
            stats.retained += 1;
            continue;
        }

        match tokio::fs::remove_file(&task.path).await {
            Ok(()) => {
                trace!("Successfully removed file. path: {}", task.path.display());
                stats.removed += 1;
            }
            Err(source) => {
                warn!(
                    "Failed to remove file. path: {}, err: {}",
                    task.path.display(),
                    source
                );
                stats.failed += 1;
                errors.record(SweepError::Delete {
                    path: task.path,
                    source,
                });
            }
        }
    }

    debug!("Deletion worker {} finished: {:?}", worker_id, stats);
    stats
}

/// Start walking `root` on the blocking pool, feeding matches into `tx`
///
/// The first traversal failure stops production and is recorded in
/// `errors`; tasks already queued keep draining. The channel closes when the
/// returned handle completes. The handle yields the number of tasks queued.
pub fn spawn_producer(
    root: PathBuf,
    matcher: SessionMatcher,
    skip: Option<PathBuf>,
    tx: mpsc::Sender<FileTask>,
    errors: ErrorAggregator,
) -> JoinHandle<usize> {
    tokio::task::spawn_blocking(move || {
        let mut queued = 0;

        for candidate in walk_candidates(&root, &matcher, skip.as_deref()) {
            match candidate {
                Ok(task) => {
                    // Blocks while the queue is full
                    if tx.blocking_send(task).is_err() {
                        debug!("Deletion workers stopped, ending walk of {}", root.display());
                        break;
                    }
                    queued += 1;
                }
                Err(e) => {
                    warn!("Failed to walk the path. root: {}, err: {}", root.display(), e);
                    errors.record(e);
                    break;
                }
            }
        }

        queued
    })
}

/// Run one producer and a worker pool to completion
pub async fn run_pipeline(
    root: PathBuf,
    matcher: SessionMatcher,
    skip: Option<PathBuf>,
    workers: usize,
    queue_capacity: usize,
    retention: Duration,
    errors: ErrorAggregator,
) -> PoolStats {
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));

    let producer = spawn_producer(root, matcher, skip, tx, errors.clone());
    let stats = WorkerPool::new(workers, retention).run(rx, errors.clone()).await;

    match producer.await {
        Ok(queued) => debug!("Walker queued {} session files", queued),
        Err(e) => {
            warn!("Walker did not complete: {}", e);
            errors.record(SweepError::TaskJoin(e));
        }
    }

    stats
}
