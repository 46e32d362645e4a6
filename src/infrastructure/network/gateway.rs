// SPDX-License-Identifier: MIT

use crate::common::retry::retry_async;
use crate::domain::constants::{
    BPS_DENOMINATOR, EXECUTE_GAS_HEADROOM_BPS, FALLBACK_EXECUTE_GAS_LIMIT,
};
use crate::domain::error::AppError;
use crate::infrastructure::network::contracts::{Erc20, SwapBatcher, UniV2Router};
use crate::network::provider::HttpProvider;
use crate::services::batching::orders::QueuedOrder;
use crate::services::routing::paths::Path;
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::AccessList;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::RpcError;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

/// Terminal receipt states. A receipt that never appears within the timeout
/// window surfaces as `LedgerUnavailable`, not as either of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed { block_number: u64 },
    Reverted,
}

/// Read/write access to the external ledger. Every call is a network
/// round-trip with an explicit timeout; nothing is cached, since pool reserves
/// and the queue drift between blocks.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// ERC-20 decimals for a token, fetched fresh from the ledger.
    async fn decimals(&self, token: Address) -> Result<u8, AppError>;

    /// Quoted output amount for swapping `amount_in` along `path`.
    async fn quote(&self, path: &Path, amount_in: U256) -> Result<U256, AppError>;

    /// Number of pending orders in the batcher queue.
    async fn queue_length(&self) -> Result<u64, AppError>;

    /// The pending order at a FIFO index.
    async fn order_at(&self, index: u64) -> Result<QueuedOrder, AppError>;

    /// Submit the batch-execute transaction; returns its hash once accepted
    /// by the node. Submission cannot be undone by the caller.
    async fn submit_batch_execute(&self) -> Result<B256, AppError>;

    /// Wait for the submitted transaction to reach the configured
    /// confirmation depth.
    async fn await_confirmation(&self, tx: B256) -> Result<ConfirmationStatus, AppError>;
}

#[derive(Clone, Debug)]
pub struct EvmLedgerConfig {
    pub router: Address,
    pub batcher: Address,
    pub chain_id: u64,
    pub call_timeout: Duration,
    pub receipt_poll: Duration,
    pub receipt_timeout: Duration,
    pub confirmation_depth: u64,
}

/// Alloy-backed gateway to a UniswapV2-style router and the SwapBatcher
/// queue contract.
#[derive(Clone)]
pub struct EvmLedger {
    provider: HttpProvider,
    signer: PrivateKeySigner,
    config: EvmLedgerConfig,
}

impl EvmLedger {
    pub fn new(provider: HttpProvider, signer: PrivateKeySigner, config: EvmLedgerConfig) -> Self {
        Self {
            provider,
            signer,
            config,
        }
    }

    /// Bound a ledger call by the configured timeout. The inner result is
    /// left to the caller so call-specific failures keep their taxonomy.
    /// Accepts `IntoFuture` because alloy call builders are lazy and only
    /// become futures when awaited.
    async fn bounded<T, E, F>(&self, call: &'static str, fut: F) -> Result<Result<T, E>, AppError>
    where
        F: IntoFuture<Output = Result<T, E>>,
    {
        timeout(self.config.call_timeout, fut.into_future())
            .await
            .map_err(|_| AppError::LedgerUnavailable {
                call,
                timeout_ms: self.config.call_timeout.as_millis() as u64,
            })
    }

    fn quote_error(path: &Path, err: alloy::contract::Error) -> AppError {
        match err {
            // A node-side error response is a definitive answer (no pool,
            // reverted quote), not an availability problem.
            alloy::contract::Error::TransportError(RpcError::ErrorResp(resp)) => {
                AppError::QuoteFailed {
                    path: path.describe(),
                    reason: resp.message.to_string(),
                }
            }
            other => AppError::Connection(format!("getAmountsOut failed: {other}")),
        }
    }

    async fn next_nonce(&self) -> Result<u64, AppError> {
        let provider = self.provider.clone();
        let from = self.signer.address();
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move { provider.get_transaction_count(from).pending().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch nonce: {e}")))
    }

    async fn execute_gas_limit(&self, calldata: Vec<u8>) -> Result<u64, AppError> {
        let request = TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(self.config.batcher)),
            input: TransactionInput::new(calldata.into()),
            ..Default::default()
        };
        match self
            .bounded("estimate_gas", self.provider.estimate_gas(request))
            .await?
        {
            Ok(gas) => Ok(gas.saturating_mul(EXECUTE_GAS_HEADROOM_BPS) / BPS_DENOMINATOR),
            // An estimation revert means executeBatch itself would revert.
            Err(RpcError::ErrorResp(resp)) => Err(AppError::ExecutionFailed {
                hash: None,
                reason: format!("executeBatch would revert: {}", resp.message),
            }),
            Err(e) => {
                tracing::warn!(target: "gateway", error = %e, "estimate_gas failed; using fallback limit");
                Ok(FALLBACK_EXECUTE_GAS_LIMIT)
            }
        }
    }
}

impl Ledger for EvmLedger {
    async fn decimals(&self, token: Address) -> Result<u8, AppError> {
        let erc20 = Erc20::new(token, self.provider.clone());
        self.bounded("decimals", erc20.decimals().call())
            .await?
            .map_err(|e| AppError::Connection(format!("decimals({token:#x}) failed: {e}")))
    }

    async fn quote(&self, path: &Path, amount_in: U256) -> Result<U256, AppError> {
        let router = UniV2Router::new(self.config.router, self.provider.clone());
        let amounts = self
            .bounded(
                "getAmountsOut",
                router.getAmountsOut(amount_in, path.tokens().to_vec()).call(),
            )
            .await?
            .map_err(|e| Self::quote_error(path, e))?;
        amounts
            .last()
            .copied()
            .ok_or_else(|| AppError::QuoteFailed {
                path: path.describe(),
                reason: "router returned no amounts".into(),
            })
    }

    async fn queue_length(&self) -> Result<u64, AppError> {
        let batcher = SwapBatcher::new(self.config.batcher, self.provider.clone());
        let len = self
            .bounded("getQueueLength", batcher.getQueueLength().call())
            .await?
            .map_err(|e| AppError::Connection(format!("getQueueLength failed: {e}")))?;
        Ok(len.try_into().unwrap_or(u64::MAX))
    }

    async fn order_at(&self, index: u64) -> Result<QueuedOrder, AppError> {
        let batcher = SwapBatcher::new(self.config.batcher, self.provider.clone());
        let order = self
            .bounded("getOrder", batcher.getOrder(U256::from(index)).call())
            .await?
            .map_err(|e| AppError::Connection(format!("getOrder({index}) failed: {e}")))?;
        Ok(QueuedOrder {
            user: order.user,
            amount_in: order.amountIn,
            min_amount_out: order.minAmountOut,
            path: order.path,
            deadline: order.deadline.try_into().unwrap_or(u64::MAX),
            position: index,
        })
    }

    async fn submit_batch_execute(&self) -> Result<B256, AppError> {
        let calldata = SwapBatcher::executeBatchCall {}.abi_encode();

        let nonce = self.next_nonce().await?;
        let fees = self
            .bounded("estimate_eip1559_fees", self.provider.estimate_eip1559_fees())
            .await?
            .map_err(|e| AppError::Connection(format!("Fee estimation failed: {e}")))?;
        let gas_limit = self.execute_gas_limit(calldata.clone()).await?;

        let mut tx = TxEip1559 {
            chain_id: self.config.chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            to: TxKind::Call(self.config.batcher),
            value: U256::ZERO,
            access_list: AccessList::default(),
            input: calldata.into(),
        };
        let sig = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| AppError::ExecutionFailed {
                hash: None,
                reason: format!("Sign tx failed: {e}"),
            })?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        let raw = signed.encoded_2718();
        let hash = *signed.tx_hash();

        // The hash is fixed before broadcast. If the send ack never arrives
        // the transaction may still have reached the node, so the hash must
        // survive into the error for the caller to reconcile against.
        match self
            .bounded("send_raw_transaction", self.provider.send_raw_transaction(&raw))
            .await
        {
            Ok(Ok(_pending)) => {}
            Ok(Err(e)) => {
                return Err(AppError::ExecutionFailed {
                    hash: Some(format!("{hash:#x}")),
                    reason: format!("send failed: {e}"),
                });
            }
            Err(_) => {
                return Err(AppError::ExecutionFailed {
                    hash: Some(format!("{hash:#x}")),
                    reason: format!(
                        "send_raw_transaction ack timed out after {}ms; transaction may be in flight",
                        self.config.call_timeout.as_millis()
                    ),
                });
            }
        }

        tracing::info!(target: "gateway", tx = %format!("{hash:#x}"), nonce, gas_limit, "executeBatch submitted");
        Ok(hash)
    }

    async fn await_confirmation(&self, tx: B256) -> Result<ConfirmationStatus, AppError> {
        let deadline = Instant::now() + self.config.receipt_timeout;
        loop {
            let receipt = self
                .bounded(
                    "get_transaction_receipt",
                    self.provider.get_transaction_receipt(tx),
                )
                .await?
                .map_err(|e| AppError::Connection(format!("Receipt fetch failed: {e}")))?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Ok(ConfirmationStatus::Reverted);
                }
                let mined = receipt.block_number.unwrap_or_default();
                if self.config.confirmation_depth <= 1 {
                    return Ok(ConfirmationStatus::Confirmed { block_number: mined });
                }
                let head = self
                    .bounded("get_block_number", self.provider.get_block_number())
                    .await?
                    .map_err(|e| AppError::Connection(format!("Block number fetch failed: {e}")))?;
                if head.saturating_add(1) >= mined.saturating_add(self.config.confirmation_depth) {
                    return Ok(ConfirmationStatus::Confirmed { block_number: mined });
                }
            }

            if Instant::now() >= deadline {
                return Err(AppError::LedgerUnavailable {
                    call: "await_confirmation",
                    timeout_ms: self.config.receipt_timeout.as_millis() as u64,
                });
            }
            sleep(self.config.receipt_poll).await;
        }
    }
}
