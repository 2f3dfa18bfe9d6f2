//! Persistence client seam and retry loop
//!
//! Durable storage lives outside this crate. The sync worker hands it batches
//! of node records through [`PersistenceClient`] and retries failed pushes
//! with exponential backoff, publishing progress as a [`SyncStatus`] so the
//! host can show a "reconnecting" indicator and, on exhaustion, a failure
//! notice.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::Node;
use crate::services::error::PersistenceError;

/// Accepts batches of node records and stores them durably
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn push(&self, batch: &[Node]) -> anyhow::Result<()>;
}

/// Sync progress as seen by the host UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    /// A push failed and attempt `attempt + 1` is scheduled
    Reconnecting { attempt: u32 },
    /// The retry budget ran out; the batch is queued again for the next flush
    Failed { attempts: u32, last_error: String },
}

/// Attempt budget and backoff curve for a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): base, 2x, 4x, ... capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Push `batch`, retrying with backoff until it succeeds or the budget runs out
///
/// Returns the number of attempts used. Each scheduled retry is announced on
/// `status` as [`SyncStatus::Reconnecting`]; the final status is left to the
/// caller.
///
/// # Errors
///
/// [`PersistenceError::Exhausted`] with the last transport error once
/// `policy.max_attempts` pushes have failed.
pub async fn push_with_retry<C>(
    client: &C,
    batch: &[Node],
    policy: &RetryPolicy,
    status: &watch::Sender<SyncStatus>,
) -> Result<u32, PersistenceError>
where
    C: PersistenceClient + ?Sized,
{
    let mut attempt = 1;

    loop {
        match client.push(batch).await {
            Ok(()) => {
                if attempt > 1 {
                    tracing::debug!(
                        "Push of {} nodes succeeded after {} attempts",
                        batch.len(),
                        attempt
                    );
                }
                return Ok(attempt);
            }

            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Push attempt {}/{} failed: {:#}. Retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    e,
                    delay
                );
                status.send_replace(SyncStatus::Reconnecting { attempt });
                tokio::time::sleep(delay).await;
                attempt += 1;
            }

            Err(e) => {
                tracing::error!(
                    "Push of {} nodes failed after {} attempts: {:#}",
                    batch.len(),
                    attempt,
                    e
                );
                return Err(PersistenceError::exhausted(attempt, format!("{e:#}")));
            }
        }
    }
}
