// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Ledger unavailable: {call} timed out after {timeout_ms}ms")]
    LedgerUnavailable { call: &'static str, timeout_ms: u64 },

    #[error("Invalid slippage {0}%: must be within 0..=100")]
    InvalidSlippage(f64),

    #[error("No viable path: every candidate quote failed or returned zero output")]
    NoViablePath,

    #[error("Quote failed for path {path}: {reason}")]
    QuoteFailed { path: String, reason: String },

    #[error("Batch execution failed ({hash:?}): {reason}")]
    ExecutionFailed {
        hash: Option<String>,
        reason: String,
    },

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Address {0} is invalid")]
    InvalidAddress(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// True when the ledger could not be reached at all, as opposed to a
    /// definitive answer such as a reverted quote. Callers should retry with
    /// backoff instead of treating the result as final.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::LedgerUnavailable { .. } | AppError::Connection(_)
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_classification() {
        assert!(
            AppError::LedgerUnavailable {
                call: "quote",
                timeout_ms: 5_000
            }
            .is_unavailable()
        );
        assert!(AppError::Connection("refused".into()).is_unavailable());
        assert!(!AppError::NoViablePath.is_unavailable());
        assert!(
            !AppError::QuoteFailed {
                path: "0xaa -> 0xbb".into(),
                reason: "no pool".into()
            }
            .is_unavailable()
        );
    }
}
