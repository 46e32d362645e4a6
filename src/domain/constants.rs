// SPDX-License-Identifier: MIT

/// Basis-point denominator used for slippage math.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Pending orders required before a batch execution is triggered.
/// Overridable via `queue_threshold` in the settings file.
pub const DEFAULT_QUEUE_THRESHOLD: u64 = 5;

/// Longest candidate route, counted in tokens (direct plus one intermediate).
/// Deeper search trades quote round-trips for marginal route quality.
pub const MAX_PATH_TOKENS: usize = 3;

pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 90_000;
pub const DEFAULT_CONFIRMATION_DEPTH: u64 = 1;

/// Keeper polling cadence. The original deployment ticked every five minutes.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Multiplier (in bps) applied on top of `eth_estimateGas` for executeBatch.
pub const EXECUTE_GAS_HEADROOM_BPS: u64 = 12_000;

/// Gas limit used when estimation is unavailable.
pub const FALLBACK_EXECUTE_GAS_LIMIT: u64 = 1_500_000;
