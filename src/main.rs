// SPDX-License-Identifier: MIT

use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use batchswap::app::config::Settings;
use batchswap::app::logging::setup_logging;
use batchswap::domain::error::AppError;
use batchswap::network::gateway::{EvmLedger, EvmLedgerConfig};
use batchswap::network::provider::ConnectionFactory;
use batchswap::services::batching::keeper::Keeper;
use batchswap::services::batching::scheduler::{BatchScheduler, TriggerPolicy};
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "batchswap keeper")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Check the queue, execute if ready, then exit (cron-friendly).
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Do not submit transactions, only log the decision.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Override the configured trigger policy (polling | event_driven).
    #[arg(long)]
    policy: Option<String>,

    /// Emit JSON logs.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn parse_policy(raw: &str) -> Result<TriggerPolicy, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "polling" => Ok(TriggerPolicy::Polling),
        "event_driven" | "event-driven" => Ok(TriggerPolicy::EventDriven),
        other => Err(AppError::Config(format!(
            "Unknown trigger policy: {other}"
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = Settings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        cli.json_logs,
    );

    let policy = match cli.policy.as_deref() {
        Some(raw) => parse_policy(raw)?,
        None => settings.trigger_policy,
    };

    let provider = ConnectionFactory::http(&settings.http_rpc_url)?;

    // Auto-detect chain if not explicitly configured
    let chain_id = if settings.chain_id == 0 {
        let detected = provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("chain_id detect failed: {e}")))?;
        tracing::info!(target: "config", detected_chain = detected, rpc = %settings.http_rpc_url, "Auto-detected chain_id from RPC");
        detected
    } else {
        settings.chain_id
    };

    let signer = PrivateKeySigner::from_str(settings.keeper_key.trim())
        .map_err(|e| AppError::Config(format!("Invalid keeper key: {e}")))?;
    tracing::info!(
        target: "config",
        keeper = %format!("{:#x}", signer.address()),
        batcher = %format!("{:#x}", settings.batcher_address),
        threshold = settings.queue_threshold,
        ?policy,
        "Keeper configured"
    );

    let ledger = Arc::new(EvmLedger::new(
        provider,
        signer,
        EvmLedgerConfig {
            router: settings.router_address,
            batcher: settings.batcher_address,
            chain_id,
            call_timeout: settings.call_timeout(),
            receipt_poll: settings.receipt_poll(),
            receipt_timeout: settings.receipt_timeout(),
            confirmation_depth: settings.confirmation_depth,
        },
    ));

    let scheduler = BatchScheduler::new(
        ledger,
        settings.queue_threshold,
        policy,
        cli.dry_run,
    );
    let keeper = Keeper::new(scheduler, settings.poll_interval());

    if cli.once {
        return keeper.tick().await;
    }

    match policy {
        TriggerPolicy::Polling => keeper.run_polling().await,
        TriggerPolicy::EventDriven => {
            let ws_url = settings.ws_rpc_url.as_deref().ok_or_else(|| {
                AppError::Config("event_driven trigger requires ws_rpc_url".into())
            })?;
            let ws = ConnectionFactory::ws(ws_url).await?;
            keeper.run_event_driven(ws, settings.batcher_address).await
        }
    }
}
