// SPDX-License-Identifier: MIT

use crate::common::parsing::{format_units, parse_units};
use crate::domain::constants::BPS_DENOMINATOR;
use crate::domain::error::AppError;
use crate::infrastructure::data::token_registry::TokenRegistry;
use crate::network::gateway::Ledger;
use crate::services::routing::paths::Path;
use alloy::primitives::U256;
use futures::future::join_all;
use std::sync::Arc;

/// The chosen best route for one planning request: winning path, its raw
/// quoted output, the slippage floor the order must honor, and the symbol
/// sequence for display. Consumed immediately by order submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePlan {
    pub path: Path,
    pub amount_in: U256,
    pub best_output: U256,
    pub min_amount_out: U256,
    pub token_symbols: Vec<String>,
}

/// Validate a slippage percentage and convert it to basis points.
pub fn slippage_bps(pct: f64) -> Result<u64, AppError> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(AppError::InvalidSlippage(pct));
    }
    Ok((pct * 100.0).floor() as u64)
}

/// `amount * (10000 - bps) / 10000` in integer arithmetic. Never exceeds the
/// input; zero bps is the identity, 10000 bps zeroes it out.
pub fn apply_slippage_floor(amount: U256, bps: u64) -> U256 {
    let kept = U256::from(BPS_DENOMINATOR.saturating_sub(bps));
    amount * kept / U256::from(BPS_DENOMINATOR)
}

pub struct RoutePlanner<L> {
    ledger: Arc<L>,
    registry: Arc<TokenRegistry>,
}

impl<L: Ledger> RoutePlanner<L> {
    pub fn new(ledger: Arc<L>, registry: Arc<TokenRegistry>) -> Self {
        Self { ledger, registry }
    }

    /// Quote every candidate path for `amount_str` of the input token and
    /// pick the one with the greatest output, deriving a slippage floor.
    ///
    /// Individual path failures are logged and excluded; the operation only
    /// fails wholesale when no candidate yields output (`NoViablePath`) or the
    /// ledger itself was unreachable for every candidate.
    pub async fn plan(
        &self,
        amount_str: &str,
        candidates: &[Path],
        slippage_pct: f64,
    ) -> Result<RoutePlan, AppError> {
        let bps = slippage_bps(slippage_pct)?;
        let input_token = match candidates.first() {
            Some(first) => first.input(),
            None => return Err(AppError::NoViablePath),
        };

        // Decimals come from the ledger, never from the registry, so a stale
        // tokenlist cannot corrupt amount parsing.
        let decimals = self.ledger.decimals(input_token).await?;
        let amount_in = parse_units(amount_str, decimals)?;

        // Scatter-gather: one independent quote per candidate, all collected
        // before selection.
        let quotes = join_all(candidates.iter().map(|path| {
            let path = path.clone();
            async move {
                let result = self.ledger.quote(&path, amount_in).await;
                (path, result)
            }
        }))
        .await;

        let mut best: Option<(Path, U256)> = None;
        let mut unreachable: Option<AppError> = None;
        for (path, result) in quotes {
            let output = match result {
                Ok(output) if !output.is_zero() => output,
                Ok(_) => {
                    tracing::warn!(target: "planner", path = %path.describe(), "Skipping path: zero output");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(target: "planner", path = %path.describe(), error = %e, "Skipping path");
                    if e.is_unavailable() && unreachable.is_none() {
                        unreachable = Some(e);
                    }
                    continue;
                }
            };
            best = match best.take() {
                None => Some((path, output)),
                Some(incumbent) if prefer(&path, output, &incumbent) => Some((path, output)),
                Some(incumbent) => Some(incumbent),
            };
        }

        let (best_path, best_output) = match best {
            Some(found) => found,
            // Distinguish "no route exists" from "the ledger never answered":
            // the caller retries the latter instead of abandoning the swap.
            None => match unreachable {
                Some(err) => return Err(err),
                None => return Err(AppError::NoViablePath),
            },
        };

        let min_amount_out = apply_slippage_floor(best_output, bps);
        let token_symbols = best_path
            .tokens()
            .iter()
            .map(|t| self.registry.symbol_or_short(*t))
            .collect::<Vec<_>>();

        let out_decimals = self
            .registry
            .get(best_path.output())
            .map(|t| t.decimals)
            .unwrap_or(18);
        tracing::info!(
            target: "planner",
            route = %token_symbols.join(" -> "),
            best_output = %format_units(best_output, out_decimals),
            floor = %format_units(min_amount_out, out_decimals),
            slippage_bps = bps,
            "Route selected"
        );

        Ok(RoutePlan {
            path: best_path,
            amount_in,
            best_output,
            min_amount_out,
            token_symbols,
        })
    }
}

/// Selection rule: strictly greater output always wins. On exact ties the
/// route with fewer hops wins, then the lexicographically smaller address
/// sequence, so the outcome never depends on candidate enumeration order.
fn prefer(candidate: &Path, output: U256, incumbent: &(Path, U256)) -> bool {
    let (inc_path, inc_output) = incumbent;
    if output != *inc_output {
        return output > *inc_output;
    }
    if candidate.hops() != inc_path.hops() {
        return candidate.hops() < inc_path.hops();
    }
    candidate.tokens() < inc_path.tokens()
}
