//! Persist queue: a bounded channel drained by a fixed worker pool.
//!
//! Submission never waits. When the channel is full the job is dropped and logged; the
//! client already has its response, and the next identical request simply renders again.
//!
//! Shutdown: [`PersistQueue::shutdown`] stops accepting jobs, lets the pool finish every job
//! already queued or running, and gives up after the configured grace period.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use resizer_core::LogEvent;

use crate::context::PersistHandler;
use crate::persist::PersistJob;

#[derive(Clone, Debug)]
pub struct PersistQueueConfig {
    pub capacity: usize,
    pub max_workers: usize,
    pub shutdown_grace: Duration,
}

impl Default for PersistQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_workers: 4,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// Result of [`PersistQueue::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    /// The queue was full; the job was discarded.
    Dropped,
    /// The queue is shutting down; the job was discarded.
    Closed,
}

pub struct PersistQueue {
    jobs_tx: mpsc::Sender<PersistJob>,
    shutdown_tx: mpsc::Sender<()>,
    pool: Mutex<Option<JoinHandle<()>>>,
    config: PersistQueueConfig,
}

impl PersistQueue {
    /// Spawn the worker pool and return the handle used to submit jobs.
    pub fn start(config: PersistQueueConfig, handler: Arc<dyn PersistHandler>) -> Self {
        let capacity = config.capacity.max(1);
        let max_workers = config.max_workers.max(1);
        let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let pool = tokio::spawn(Self::worker_pool(
            jobs_rx,
            handler,
            capacity,
            max_workers,
            shutdown_rx,
        ));

        Self {
            jobs_tx,
            shutdown_tx,
            pool: Mutex::new(Some(pool)),
            config,
        }
    }

    /// Enqueue a job without waiting.
    pub fn submit(&self, job: PersistJob) -> SubmitOutcome {
        let object_name = job.record.object_name.clone();
        match self.jobs_tx.try_send(job) {
            Ok(()) => {
                tracing::debug!(
                    event = %LogEvent::PersistQueued,
                    object_name = %object_name,
                    queued = self.queued(),
                    "Persist job queued"
                );
                SubmitOutcome::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    event = %LogEvent::PersistDropped,
                    object_name = %object_name,
                    capacity = self.config.capacity,
                    "Persist queue full, dropping job"
                );
                SubmitOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(
                    event = %LogEvent::PersistDropped,
                    object_name = %object_name,
                    "Persist queue closed, dropping job"
                );
                SubmitOutcome::Closed
            }
        }
    }

    /// Jobs waiting in the channel, not counting those already running.
    pub fn queued(&self) -> usize {
        self.jobs_tx.max_capacity() - self.jobs_tx.capacity()
    }

    /// Stop accepting jobs and drain. Returns false when the grace period ran out and the
    /// remaining work was abandoned.
    pub async fn shutdown(&self) -> bool {
        let Some(mut pool) = self.pool.lock().await.take() else {
            return true;
        };

        tracing::info!(
            queued = self.queued(),
            grace_secs = self.config.shutdown_grace.as_secs(),
            "Initiating persist queue shutdown"
        );
        let _ = self.shutdown_tx.send(()).await;

        match tokio::time::timeout(self.config.shutdown_grace, &mut pool).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Persist worker pool panicked");
                false
            }
            Err(_) => {
                tracing::warn!("Persist queue did not drain in time, abandoning remaining jobs");
                pool.abort();
                false
            }
        }
    }

    async fn worker_pool(
        mut jobs_rx: mpsc::Receiver<PersistJob>,
        handler: Arc<dyn PersistHandler>,
        capacity: usize,
        max_workers: usize,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(
            capacity = capacity,
            max_workers = max_workers,
            "Persist queue worker pool started"
        );

        let semaphore = Arc::new(Semaphore::new(max_workers));
        let mut running = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("Persist queue worker pool shutting down");
                    break;
                }
                job = jobs_rx.recv() => match job {
                    Some(job) => {
                        Self::dispatch(job, &handler, &semaphore, &mut running).await;
                    }
                    None => break,
                }
            }
        }

        // Drain whatever was accepted before the channel closed.
        jobs_rx.close();
        while let Some(job) = jobs_rx.recv().await {
            Self::dispatch(job, &handler, &semaphore, &mut running).await;
        }
        while running.join_next().await.is_some() {}

        tracing::info!("Persist queue worker pool stopped");
    }

    async fn dispatch(
        job: PersistJob,
        handler: &Arc<dyn PersistHandler>,
        semaphore: &Arc<Semaphore>,
        running: &mut JoinSet<()>,
    ) {
        // Reap finished workers so the set does not grow without bound.
        while running.try_join_next().is_some() {}

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        let handler = handler.clone();
        running.spawn(async move {
            let _permit = permit;
            let object_name = job.record.object_name.clone();
            if let Err(e) = handler.handle(job).await {
                tracing::error!(
                    event = %LogEvent::PersistFailed,
                    object_name = %object_name,
                    error = %format!("{:#}", e),
                    "Persist job failed"
                );
            }
        });
    }
}
