// SPDX-License-Identifier: MIT

use crate::domain::constants;
use crate::domain::error::AppError;
use crate::services::batching::scheduler::TriggerPolicy;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_debug")]
    pub debug: bool,

    // Ledger endpoints
    pub http_rpc_url: String,
    pub ws_rpc_url: Option<String>,
    /// 0 means auto-detect from the RPC endpoint.
    #[serde(default)]
    pub chain_id: u64,

    // On-chain collaborators
    pub router_address: Address,
    pub batcher_address: Address,

    /// Keeper signing key, hex. Usually supplied via env, not the file.
    pub keeper_key: String,

    // Batch trigger
    #[serde(default = "default_queue_threshold")]
    pub queue_threshold: u64,
    #[serde(default = "default_trigger_policy")]
    pub trigger_policy: TriggerPolicy,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    // Ledger call budgets
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_confirmation_depth")]
    pub confirmation_depth: u64,

    // Planning
    #[serde(default = "default_slippage_pct")]
    pub default_slippage_pct: f64,
    #[serde(default = "default_tokenlist_path")]
    pub tokenlist_path: String,
}

fn default_debug() -> bool {
    false
}
fn default_queue_threshold() -> u64 {
    constants::DEFAULT_QUEUE_THRESHOLD
}
fn default_trigger_policy() -> TriggerPolicy {
    TriggerPolicy::Polling
}
fn default_poll_interval_secs() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_SECS
}
fn default_call_timeout_ms() -> u64 {
    constants::DEFAULT_CALL_TIMEOUT_MS
}
fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}
fn default_confirmation_depth() -> u64 {
    constants::DEFAULT_CONFIRMATION_DEPTH
}
fn default_slippage_pct() -> f64 {
    0.5
}
fn default_tokenlist_path() -> String {
    "tokenlist.json".to_string()
}

impl Settings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env if present; real deployments keep keeper_key there.
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected) = path {
            builder = builder.add_source(File::from(Path::new(selected)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Precedence: CLI flags (applied in main) > env > file.
        builder = builder.add_source(Environment::with_prefix("BATCHSWAP"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.keeper_key.trim().is_empty() {
            return Err(AppError::Config("keeper_key is missing".into()));
        }
        if self.queue_threshold == 0 {
            return Err(AppError::Config(
                "queue_threshold must be at least 1".into(),
            ));
        }
        if self.trigger_policy == TriggerPolicy::EventDriven && self.ws_rpc_url.is_none() {
            return Err(AppError::Config(
                "event_driven trigger requires ws_rpc_url".into(),
            ));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Settings {
        Settings {
            debug: false,
            http_rpc_url: "http://localhost:8545".into(),
            ws_rpc_url: None,
            chain_id: 128_123,
            router_address: Address::ZERO,
            batcher_address: Address::ZERO,
            keeper_key: "0a".repeat(32),
            queue_threshold: default_queue_threshold(),
            trigger_policy: default_trigger_policy(),
            poll_interval_secs: default_poll_interval_secs(),
            call_timeout_ms: default_call_timeout_ms(),
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
            confirmation_depth: default_confirmation_depth(),
            default_slippage_pct: default_slippage_pct(),
            tokenlist_path: default_tokenlist_path(),
        }
    }

    #[test]
    fn defaults_are_sane() {
        let settings = base();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.queue_threshold, 5);
        assert_eq!(settings.trigger_policy, TriggerPolicy::Polling);
    }

    #[test]
    fn rejects_missing_key_and_zero_threshold() {
        let mut settings = base();
        settings.keeper_key = " ".into();
        assert!(settings.validate().is_err());

        let mut settings = base();
        settings.queue_threshold = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn event_driven_requires_ws() {
        let mut settings = base();
        settings.trigger_policy = TriggerPolicy::EventDriven;
        assert!(settings.validate().is_err());
        settings.ws_rpc_url = Some("ws://localhost:8546".into());
        assert!(settings.validate().is_ok());
    }
}
