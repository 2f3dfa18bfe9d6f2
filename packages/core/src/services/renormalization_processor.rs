//! Background Renormalization Processor
//!
//! Runs the renormalization pass off the UI path:
//! - On a fixed interval (default every 20s)
//! - On demand through a cloneable [`RenormalizationWaker`], debounced: every
//!   wake pushes the deadline back, and the pass runs once on the trailing edge
//!   against the tree as it is at that moment
//!
//! A single task owns the schedule, so two passes never overlap. Dropping the
//! processor aborts the task and with it any pending deadline.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::db::NodeStore;
use crate::services::{ConfigError, OutlineConfig, SharedOutline};
use crate::tree::RenormalizationReport;

/// Handle to request a renormalization pass
///
/// Wakes are coalesced: any number of them inside one debounce window result
/// in a single pass.
#[derive(Clone)]
pub struct RenormalizationWaker {
    trigger_tx: mpsc::Sender<()>,
}

impl RenormalizationWaker {
    pub fn wake(&self) {
        match self.trigger_tx.try_send(()) {
            Ok(_) => {
                tracing::debug!("RenormalizationProcessor wake signal sent");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("RenormalizationProcessor already has pending wake");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("RenormalizationProcessor has shut down, wake ignored");
            }
        }
    }
}

/// Counters published after every pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenormalizationStats {
    pub passes: u64,
    pub last_report: RenormalizationReport,
}

pub struct RenormalizationProcessor {
    waker: RenormalizationWaker,
    stats: watch::Receiver<RenormalizationStats>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RenormalizationProcessor {
    /// Validate `config` and spawn the processor task on the current runtime
    pub fn new<S>(tree: SharedOutline<S>, config: &OutlineConfig) -> Result<Self, ConfigError>
    where
        S: NodeStore + 'static,
    {
        config.validate()?;
        let interval = config.renormalize_interval();
        let debounce = config.renormalize_debounce();
        tracing::info!(
            "RenormalizationProcessor starting (interval {:?}, debounce {:?})",
            interval,
            debounce
        );

        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (stats_tx, stats) = watch::channel(RenormalizationStats::default());

        let handle = tokio::spawn(Self::run(
            tree,
            interval,
            debounce,
            trigger_rx,
            shutdown_rx,
            stats_tx,
        ));

        Ok(Self {
            waker: RenormalizationWaker { trigger_tx },
            stats,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    async fn run<S: NodeStore + 'static>(
        tree: SharedOutline<S>,
        interval: Duration,
        debounce: Duration,
        mut trigger_rx: mpsc::Receiver<()>,
        mut shutdown_rx: oneshot::Receiver<()>,
        stats_tx: watch::Sender<RenormalizationStats>,
    ) {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline: Option<Instant> = None;

        loop {
            let debounced = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    tracing::info!("RenormalizationProcessor shutting down");
                    break;
                }

                trigger = trigger_rx.recv() => {
                    if trigger.is_none() {
                        break;
                    }
                    deadline = Some(Instant::now() + debounce);
                }

                _ = debounced => {
                    deadline = None;
                    Self::run_pass(&tree, &stats_tx).await;
                }

                _ = ticker.tick() => {
                    Self::run_pass(&tree, &stats_tx).await;
                }
            }
        }
    }

    async fn run_pass<S: NodeStore>(
        tree: &SharedOutline<S>,
        stats_tx: &watch::Sender<RenormalizationStats>,
    ) {
        let report = tree.lock().await.renormalize();
        stats_tx.send_modify(|stats| {
            stats.passes += 1;
            stats.last_report = report;
        });
    }

    pub fn waker(&self) -> RenormalizationWaker {
        self.waker.clone()
    }

    pub fn wake(&self) {
        self.waker.wake();
    }

    /// Subscribe to pass counters
    pub fn stats(&self) -> watch::Receiver<RenormalizationStats> {
        self.stats.clone()
    }

    /// Stop the task and wait for it to exit
    ///
    /// A pass already holding the tree lock finishes first; a pending debounce
    /// deadline is dropped.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down RenormalizationProcessor");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("RenormalizationProcessor task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RenormalizationProcessor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, HOME_ID};
    use crate::tree::OutlineTree;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn drifted_tree() -> SharedOutline {
        Arc::new(Mutex::new(OutlineTree::from_nodes(vec![
            Node::new("a", HOME_ID, 1.00001, ""),
            Node::new("b", HOME_ID, 1.000015, ""),
        ])))
    }

    fn passes(processor: &RenormalizationProcessor) -> u64 {
        let stats = processor.stats();
        let passes = stats.borrow().passes;
        passes
    }

    #[test]
    fn test_waker_coalesces_wakes() {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let waker = RenormalizationWaker { trigger_tx };

        waker.wake();
        waker.wake();
        waker.wake();

        let mut count = 0;
        while trigger_rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_waker_handles_closed_channel() {
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);
        let waker = RenormalizationWaker { trigger_tx };
        drop(trigger_rx);
        waker.wake();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_runs_pass_after_debounce() {
        let tree = drifted_tree();
        let processor = RenormalizationProcessor::new(tree.clone(), &OutlineConfig::default())
            .unwrap();

        processor.wake();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(passes(&processor), 0, "pass must wait for the quiet period");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(passes(&processor), 1);
        assert_eq!(tree.lock().await.get("a").unwrap().pos, 1.0);
        assert_eq!(tree.lock().await.get("b").unwrap().pos, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_wakes_collapse_into_one_trailing_pass() {
        let tree = drifted_tree();
        let processor = RenormalizationProcessor::new(tree, &OutlineConfig::default()).unwrap();
        let waker = processor.waker();

        for _ in 0..5 {
            waker.wake();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(passes(&processor), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(passes(&processor), 1);
        assert_eq!(processor.stats().borrow().last_report.rewritten.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_pass_without_wakes() {
        let tree = drifted_tree();
        let processor = RenormalizationProcessor::new(tree.clone(), &OutlineConfig::default())
            .unwrap();

        tokio::time::sleep(Duration::from_secs(19)).await;
        assert_eq!(passes(&processor), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(passes(&processor), 1);
        assert!(tree.lock().await.parents_needing_renormalization().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_pass() {
        let tree = drifted_tree();
        let processor = RenormalizationProcessor::new(tree.clone(), &OutlineConfig::default())
            .unwrap();
        let waker = processor.waker();
        let stats = processor.stats();

        waker.wake();
        processor.shutdown().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(stats.borrow().passes, 0);
        assert_eq!(tree.lock().await.get("a").unwrap().pos, 1.00001);
        waker.wake();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = OutlineConfig {
            renormalize_interval_secs: 0,
            ..Default::default()
        };
        assert!(RenormalizationProcessor::new(drifted_tree(), &config).is_err());
    }
}
