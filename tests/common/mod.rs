// SPDX-License-Identifier: MIT
#![allow(dead_code)]

//! In-process ledger double for planner and scheduler tests. Behavior is
//! fixed at construction; queue reads can be scripted to model concurrent
//! keepers racing on the same queue.

use alloy::primitives::{Address, B256, U256};
use batchswap::domain::error::AppError;
use batchswap::network::gateway::{ConfirmationStatus, Ledger};
use batchswap::services::batching::orders::QueuedOrder;
use batchswap::services::routing::paths::Path;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug)]
pub enum QuoteOutcome {
    Amount(U256),
    Zero,
    Revert,
    Unreachable,
}

#[derive(Default)]
pub struct MockLedger {
    pub decimals: HashMap<Address, u8>,
    pub quotes: HashMap<Vec<Address>, QuoteOutcome>,
    /// Queue lengths returned in order; the final value persists.
    pub scripted_lengths: Mutex<VecDeque<u64>>,
    pub queue_length: AtomicU64,
    pub length_unreachable: bool,
    /// Model the contract draining the queue when a batch lands.
    pub drain_on_execute: bool,
    pub fail_submission: bool,
    /// Model a send whose ack timed out: the signed hash is known but the
    /// broadcast may or may not have landed.
    pub submit_ack_times_out: bool,
    pub revert_execution: bool,
    pub confirmation_times_out: bool,
    pub submissions: AtomicU64,
}

impl MockLedger {
    /// Hash reported when `submit_ack_times_out` fires.
    pub const AMBIGUOUS_SEND_HASH: B256 = B256::repeat_byte(0xab);

    pub fn with_queue(len: u64) -> Self {
        let ledger = Self::default();
        ledger.queue_length.store(len, Ordering::SeqCst);
        ledger
    }

    pub fn script_lengths(self, lengths: &[u64]) -> Self {
        *self.scripted_lengths.lock().unwrap() = lengths.iter().copied().collect();
        self
    }

    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }
}

impl Ledger for MockLedger {
    async fn decimals(&self, token: Address) -> Result<u8, AppError> {
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| AppError::Connection(format!("unknown token {token:#x}")))
    }

    async fn quote(&self, path: &Path, _amount_in: U256) -> Result<U256, AppError> {
        match self.quotes.get(path.tokens()) {
            Some(QuoteOutcome::Amount(v)) => Ok(*v),
            Some(QuoteOutcome::Zero) => Ok(U256::ZERO),
            Some(QuoteOutcome::Unreachable) => Err(AppError::LedgerUnavailable {
                call: "getAmountsOut",
                timeout_ms: 5_000,
            }),
            Some(QuoteOutcome::Revert) | None => Err(AppError::QuoteFailed {
                path: path.describe(),
                reason: "no pool".into(),
            }),
        }
    }

    async fn queue_length(&self) -> Result<u64, AppError> {
        if self.length_unreachable {
            return Err(AppError::LedgerUnavailable {
                call: "getQueueLength",
                timeout_ms: 5_000,
            });
        }
        if let Some(next) = self.scripted_lengths.lock().unwrap().pop_front() {
            self.queue_length.store(next, Ordering::SeqCst);
            return Ok(next);
        }
        Ok(self.queue_length.load(Ordering::SeqCst))
    }

    async fn order_at(&self, index: u64) -> Result<QueuedOrder, AppError> {
        Ok(QueuedOrder {
            user: Address::ZERO,
            amount_in: U256::from(1u64),
            min_amount_out: U256::ZERO,
            path: vec![],
            deadline: u64::MAX,
            position: index,
        })
    }

    async fn submit_batch_execute(&self) -> Result<B256, AppError> {
        if self.fail_submission {
            return Err(AppError::ExecutionFailed {
                hash: None,
                reason: "insufficient funds".into(),
            });
        }
        if self.submit_ack_times_out {
            return Err(AppError::ExecutionFailed {
                hash: Some(format!("{:#x}", Self::AMBIGUOUS_SEND_HASH)),
                reason: "send_raw_transaction ack timed out after 5000ms; transaction may be in flight".into(),
            });
        }
        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        if self.drain_on_execute {
            self.scripted_lengths.lock().unwrap().clear();
            self.queue_length.store(0, Ordering::SeqCst);
        }
        Ok(B256::repeat_byte(0x40 + n as u8))
    }

    async fn await_confirmation(&self, _tx: B256) -> Result<ConfirmationStatus, AppError> {
        if self.confirmation_times_out {
            return Err(AppError::LedgerUnavailable {
                call: "await_confirmation",
                timeout_ms: 90_000,
            });
        }
        if self.revert_execution {
            return Ok(ConfirmationStatus::Reverted);
        }
        Ok(ConfirmationStatus::Confirmed { block_number: 100 })
    }
}
