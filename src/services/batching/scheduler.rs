// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use crate::network::gateway::{ConfirmationStatus, Ledger};
use alloy::primitives::B256;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// How a deployment decides when to drain the queue. Exactly one discipline
/// runs against a given queue; mixing both from separate keepers merely
/// produces duplicate trigger attempts, which the scheduler tolerates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Level-triggered: fire whenever the queue is at or above threshold.
    Polling,
    /// Edge-triggered: fire only when the queue is exactly at threshold,
    /// suited to per-enqueue event handlers.
    EventDriven,
}

impl TriggerPolicy {
    fn ready(self, queue_length: u64, threshold: u64) -> bool {
        match self {
            TriggerPolicy::Polling => queue_length >= threshold,
            TriggerPolicy::EventDriven => queue_length == threshold,
        }
    }
}

/// Outcome of one scheduler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Nothing submitted; the queue was not ready or another keeper got
    /// there first.
    Skipped {
        reason: &'static str,
        queue_length: u64,
    },
    /// The batch transaction is in flight but its receipt never arrived
    /// within the timeout window. The caller must reconcile, since a
    /// submission cannot be withdrawn.
    Submitted { tx: B256 },
    Confirmed { tx: B256, block_number: u64 },
    Failed { tx: Option<B256>, reason: String },
}

/// Decides whether to drain the order queue and drives one batch execution to
/// confirmation. Stateless between invocations: the authoritative queue
/// length is read fresh from the ledger every time, so the scheduler is safe
/// to run as a periodic job or a one-shot event handler, concurrently with
/// other keepers.
pub struct BatchScheduler<L> {
    ledger: Arc<L>,
    threshold: u64,
    policy: TriggerPolicy,
    dry_run: bool,
}

impl<L: Ledger> BatchScheduler<L> {
    pub fn new(ledger: Arc<L>, threshold: u64, policy: TriggerPolicy, dry_run: bool) -> Self {
        Self {
            ledger,
            threshold,
            policy,
            dry_run,
        }
    }

    /// Check the queue and execute a batch if the trigger condition holds.
    ///
    /// Errors reaching the ledger for the initial length read propagate as
    /// `Err` so the keeper can back off; everything after that point is
    /// reported through the outcome. No internal retry: re-invocation is the
    /// keeper's job.
    pub async fn maybe_execute(&self) -> Result<ExecutionOutcome, AppError> {
        let queue_length = self.ledger.queue_length().await?;
        if !self.policy.ready(queue_length, self.threshold) {
            tracing::debug!(target: "scheduler", queue_length, threshold = self.threshold, "Below threshold");
            return Ok(ExecutionOutcome::Skipped {
                reason: "below threshold",
                queue_length,
            });
        }

        self.log_head_order(queue_length).await;

        if self.dry_run {
            tracing::info!(target: "scheduler", queue_length, "Dry-run: would submit executeBatch");
            return Ok(ExecutionOutcome::Skipped {
                reason: "dry run",
                queue_length,
            });
        }

        // A concurrent keeper may have drained the queue between the first
        // read and now. Re-reading once keeps the duplicate trigger a cheap
        // no-op; a race that slips past this lands as an empty executeBatch,
        // which the contract treats as a harmless no-op.
        let recheck = self.ledger.queue_length().await?;
        if !self.policy.ready(recheck, self.threshold) {
            // Under the edge-triggered policy the queue can also grow past
            // the trigger point between the two reads.
            let reason = if recheck < self.threshold {
                tracing::info!(target: "scheduler", queue_length = recheck, "Queue drained by another keeper");
                "queue drained"
            } else {
                tracing::info!(target: "scheduler", queue_length = recheck, "Queue grew past trigger edge");
                "queue grew past trigger"
            };
            return Ok(ExecutionOutcome::Skipped {
                reason,
                queue_length: recheck,
            });
        }

        let tx = match self.ledger.submit_batch_execute().await {
            Ok(tx) => tx,
            Err(e) => {
                // The gateway reports a hash when the transaction was signed
                // and possibly broadcast; keep it so the operator can
                // reconcile an ambiguous send.
                let tx = match &e {
                    AppError::ExecutionFailed { hash: Some(h), .. } => h.parse().ok(),
                    _ => None,
                };
                tracing::error!(target: "scheduler", error = %e, "Batch submission failed");
                return Ok(ExecutionOutcome::Failed {
                    tx,
                    reason: e.to_string(),
                });
            }
        };

        match self.ledger.await_confirmation(tx).await {
            Ok(ConfirmationStatus::Confirmed { block_number }) => {
                tracing::info!(target: "scheduler", tx = %format!("{tx:#x}"), block_number, "Batch confirmed");
                Ok(ExecutionOutcome::Confirmed { tx, block_number })
            }
            Ok(ConfirmationStatus::Reverted) => Ok(ExecutionOutcome::Failed {
                tx: Some(tx),
                reason: "executeBatch reverted".into(),
            }),
            Err(e) if e.is_unavailable() => {
                tracing::warn!(target: "scheduler", tx = %format!("{tx:#x}"), error = %e, "Receipt not observed; transaction remains in flight");
                Ok(ExecutionOutcome::Submitted { tx })
            }
            Err(e) => Ok(ExecutionOutcome::Failed {
                tx: Some(tx),
                reason: e.to_string(),
            }),
        }
    }

    /// Debug visibility into what is about to be drained. Best effort; an
    /// expired head order is worth a warning since the contract will skip it.
    async fn log_head_order(&self, queue_length: u64) {
        if queue_length == 0 || !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        match self.ledger.order_at(0).await {
            Ok(order) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                if order.is_expired(now) {
                    tracing::warn!(
                        target: "scheduler",
                        user = %format!("{:#x}", order.user),
                        deadline = order.deadline,
                        "Head order already expired; contract will skip it"
                    );
                } else {
                    tracing::debug!(
                        target: "scheduler",
                        user = %format!("{:#x}", order.user),
                        amount_in = %order.amount_in,
                        min_out = %order.min_amount_out,
                        "Head of queue"
                    );
                }
            }
            Err(e) => {
                tracing::debug!(target: "scheduler", error = %e, "Head order fetch failed");
            }
        }
    }
}
