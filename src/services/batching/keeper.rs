// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use crate::network::gateway::Ledger;
use crate::network::provider::WsProvider;
use crate::services::batching::orders::{ORDER_QUEUED_SIGNATURE, OrderQueuedEvent};
use crate::services::batching::scheduler::{BatchScheduler, ExecutionOutcome};
use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::eth::Filter;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::sleep;

/// Thin trigger around the scheduler: a fixed-interval poller or an
/// on-ledger event subscription, one per deployment. The keeper owns all
/// re-invocation; the scheduler itself never retries.
pub struct Keeper<L> {
    scheduler: BatchScheduler<L>,
    poll_interval: Duration,
}

impl<L: Ledger> Keeper<L> {
    pub fn new(scheduler: BatchScheduler<L>, poll_interval: Duration) -> Self {
        Self {
            scheduler,
            poll_interval,
        }
    }

    /// Run one scheduler invocation and log its outcome. Ledger
    /// unavailability is survivable: the next trigger retries.
    pub async fn tick(&self) -> Result<(), AppError> {
        match self.scheduler.maybe_execute().await {
            Ok(outcome) => {
                log_outcome(&outcome);
                Ok(())
            }
            Err(e) if e.is_unavailable() => {
                tracing::warn!(target: "keeper", error = %e, "Ledger unreachable; will retry on next trigger");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Level-triggered loop: check the queue on a fixed cadence until ctrl-c.
    pub async fn run_polling(&self) -> Result<(), AppError> {
        tracing::info!(target: "keeper", interval_secs = self.poll_interval.as_secs(), "Polling keeper started");
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!(target: "keeper", "Shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    /// Edge-triggered loop: react to every `OrderQueued` log. The
    /// subscription is re-established with a short delay whenever the stream
    /// drops.
    pub async fn run_event_driven(
        &self,
        ws: WsProvider,
        batcher: Address,
    ) -> Result<(), AppError> {
        let filter = Filter::new().address(batcher).event(ORDER_QUEUED_SIGNATURE);
        loop {
            match ws.subscribe_logs(&filter).await {
                Ok(sub) => {
                    let mut stream = sub.into_stream();
                    tracing::info!(target: "keeper", batcher = %format!("{batcher:#x}"), "Subscribed to OrderQueued events");
                    loop {
                        tokio::select! {
                            maybe_log = stream.next() => {
                                let Some(log) = maybe_log else { break };
                                let Some(event) = OrderQueuedEvent::from_log(&log) else {
                                    continue;
                                };
                                tracing::info!(
                                    target: "keeper",
                                    order_id = %event.order_id,
                                    user = %format!("{:#x}", event.user),
                                    "Order enqueued"
                                );
                                self.tick().await?;
                            }
                            _ = tokio::signal::ctrl_c() => {
                                tracing::info!(target: "keeper", "Shutdown requested");
                                return Ok(());
                            }
                        }
                    }
                    tracing::warn!(target: "keeper", "OrderQueued subscription ended, resubscribing");
                }
                Err(e) => {
                    tracing::warn!(target: "keeper", error = %e, "OrderQueued subscribe failed, retrying");
                }
            }
            sleep(Duration::from_secs(2)).await;
        }
    }
}

fn log_outcome(outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Skipped {
            reason,
            queue_length,
        } => {
            tracing::info!(target: "keeper", reason, queue_length, "Batch skipped");
        }
        ExecutionOutcome::Submitted { tx } => {
            tracing::warn!(target: "keeper", tx = %format!("{tx:#x}"), "Batch submitted but unconfirmed; reconcile on next trigger");
        }
        ExecutionOutcome::Confirmed { tx, block_number } => {
            tracing::info!(target: "keeper", tx = %format!("{tx:#x}"), block_number, "Batch executed");
        }
        ExecutionOutcome::Failed { tx, reason } => {
            tracing::error!(
                target: "keeper",
                tx = %tx.map(|t| format!("{t:#x}")).unwrap_or_else(|| "none".into()),
                reason,
                "Batch execution failed"
            );
        }
    }
}
