// SPDX-License-Identifier: MIT

//! One-shot route planning from the command line: resolve the best path and
//! slippage floor for a swap, the same call the UI makes before submitting an
//! order.

use alloy::primitives::Address;
use batchswap::app::config::Settings;
use batchswap::app::logging::setup_logging;
use batchswap::common::parsing::{format_units, parse_address_hex};
use batchswap::domain::error::AppError;
use batchswap::infrastructure::data::token_registry::TokenRegistry;
use batchswap::network::gateway::{EvmLedger, EvmLedgerConfig};
use batchswap::network::provider::ConnectionFactory;
use batchswap::services::routing::paths::generate_paths;
use batchswap::services::routing::planner::RoutePlanner;
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "plan the best swap route")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Input token: registry symbol or 0x-address.
    #[arg(long)]
    from: String,

    /// Output token: registry symbol or 0x-address.
    #[arg(long)]
    to: String,

    /// Human amount of the input token, e.g. "10.5".
    #[arg(long)]
    amount: String,

    /// Slippage tolerance percent; defaults to the configured value.
    #[arg(long)]
    slippage: Option<f64>,
}

fn resolve_token(registry: &TokenRegistry, raw: &str) -> Result<Address, AppError> {
    if let Some(addr) = registry.resolve_symbol(raw) {
        return Ok(addr);
    }
    parse_address_hex(raw).ok_or_else(|| AppError::InvalidAddress(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = Settings::load_with_path(cli.config.as_deref())?;
    setup_logging(if settings.debug { "debug" } else { "warn" }, false);

    let registry = Arc::new(TokenRegistry::load_from_file(&settings.tokenlist_path)?);
    if registry.is_empty() {
        return Err(AppError::Config(format!(
            "Tokenlist {} has no entries",
            settings.tokenlist_path
        )));
    }

    let from = resolve_token(&registry, &cli.from)?;
    let to = resolve_token(&registry, &cli.to)?;
    let slippage = cli.slippage.unwrap_or(settings.default_slippage_pct);

    let provider = ConnectionFactory::http(&settings.http_rpc_url)?;
    let signer = alloy::signers::local::PrivateKeySigner::from_str(settings.keeper_key.trim())
        .map_err(|e| AppError::Config(format!("Invalid keeper key: {e}")))?;
    let ledger = Arc::new(EvmLedger::new(
        provider,
        signer,
        EvmLedgerConfig {
            router: settings.router_address,
            batcher: settings.batcher_address,
            chain_id: settings.chain_id,
            call_timeout: settings.call_timeout(),
            receipt_poll: settings.receipt_poll(),
            receipt_timeout: settings.receipt_timeout(),
            confirmation_depth: settings.confirmation_depth,
        },
    ));

    let candidates = generate_paths(from, to, &registry.universe());
    let planner = RoutePlanner::new(ledger, registry.clone());
    let plan = planner.plan(&cli.amount, &candidates, slippage).await?;

    let out_decimals = registry.get(plan.path.output()).map(|t| t.decimals).unwrap_or(18);
    println!("route:      {}", plan.token_symbols.join(" -> "));
    println!("amount in:  {}", cli.amount.trim());
    println!(
        "best out:   {} ({} raw)",
        format_units(plan.best_output, out_decimals),
        plan.best_output
    );
    println!(
        "floor:      {} ({} raw, {slippage}% slippage)",
        format_units(plan.min_amount_out, out_decimals),
        plan.min_amount_out
    );
    Ok(())
}
