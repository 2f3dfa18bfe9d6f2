//! Dirty-set flush worker
//!
//! Mutations only mark ids dirty. This worker drains the dirty set on a fixed
//! interval (default every 10s), pushes the affected records plus their parents
//! as one batch, and retries failed pushes with backoff. If the retry budget
//! runs out, the ids go back into the dirty set for the next flush; the
//! in-memory tree is never rolled back.
//!
//! The tree lock is held only while the batch is taken and, on failure, while
//! the ids are re-queued. Pushes run unlocked, so edits keep flowing while a
//! slow backend is retried.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::db::NodeStore;
use crate::services::persistence::{push_with_retry, PersistenceClient, RetryPolicy, SyncStatus};
use crate::services::{ConfigError, OutlineConfig, PersistenceError, SharedOutline};

type FlushReply = oneshot::Sender<Result<usize, PersistenceError>>;

pub struct SyncWorker {
    status: watch::Receiver<SyncStatus>,
    flush_tx: mpsc::Sender<FlushReply>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Validate `config` and spawn the flush task on the current runtime
    pub fn new<S, C>(
        tree: SharedOutline<S>,
        client: Arc<C>,
        config: &OutlineConfig,
    ) -> Result<Self, ConfigError>
    where
        S: NodeStore + 'static,
        C: PersistenceClient + ?Sized + 'static,
    {
        config.validate()?;
        let flush_interval = config.flush_interval();
        let policy = config.retry_policy();
        tracing::info!(
            "SyncWorker starting (flush every {:?}, up to {} attempts)",
            flush_interval,
            policy.max_attempts
        );

        let (flush_tx, mut flush_rx) = mpsc::channel::<FlushReply>(4);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (status_tx, status) = watch::channel(SyncStatus::Idle);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + flush_interval, flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = &mut shutdown_rx => {
                        tracing::info!("SyncWorker shutting down");
                        break;
                    }

                    request = flush_rx.recv() => {
                        let Some(reply) = request else {
                            break;
                        };
                        let result = Self::flush(&tree, client.as_ref(), &policy, &status_tx).await;
                        let _ = reply.send(result);
                    }

                    _ = ticker.tick() => {
                        if let Err(e) = Self::flush(&tree, client.as_ref(), &policy, &status_tx).await {
                            tracing::debug!("Scheduled flush failed, ids re-queued: {}", e);
                        }
                    }
                }
            }
        });

        Ok(Self {
            status,
            flush_tx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Push everything currently dirty. Returns the number of records sent.
    async fn flush<S, C>(
        tree: &SharedOutline<S>,
        client: &C,
        policy: &RetryPolicy,
        status: &watch::Sender<SyncStatus>,
    ) -> Result<usize, PersistenceError>
    where
        S: NodeStore,
        C: PersistenceClient + ?Sized,
    {
        let batch = tree.lock().await.take_dirty_batch();
        if batch.nodes.is_empty() {
            return Ok(0);
        }

        status.send_replace(SyncStatus::Syncing);
        tracing::debug!(
            "Flushing {} dirty ids as {} records",
            batch.ids.len(),
            batch.nodes.len()
        );

        match push_with_retry(client, &batch.nodes, policy, status).await {
            Ok(_) => {
                status.send_replace(SyncStatus::Idle);
                Ok(batch.nodes.len())
            }
            Err(e) => {
                tree.lock().await.requeue(batch.ids);
                if let PersistenceError::Exhausted {
                    attempts,
                    last_error,
                } = &e
                {
                    status.send_replace(SyncStatus::Failed {
                        attempts: *attempts,
                        last_error: last_error.clone(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Subscribe to sync status changes
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Flush immediately instead of waiting for the next tick
    ///
    /// # Errors
    ///
    /// - `Exhausted` if the push failed on every attempt
    /// - `WorkerStopped` if the worker task is gone
    pub async fn flush_now(&self) -> Result<usize, PersistenceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.flush_tx
            .send(reply_tx)
            .await
            .map_err(|_| PersistenceError::WorkerStopped)?;
        reply_rx
            .await
            .map_err(|_| PersistenceError::WorkerStopped)?
    }

    /// Stop the worker. Ids still dirty stay in the tree.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down SyncWorker");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("SyncWorker task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
