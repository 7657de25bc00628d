//! Trade Dispatcher
//!
//! Turns a `TradeDecision` into at most one settlement transaction.
//!
//! Order of checks:
//! 1. `execute` flag (profit > 0)
//! 2. safety governor limit (only when enforcement is enabled)
//! 3. trade size for the route's starting family is non-zero
//! 4. settlement contract holds collateral in that family's token
//! 5. live mode; in dry-run the would-be transaction is logged and dropped
//!
//! The trade size comes from the same `TradeSizes` the simulator used.

use super::governor::{AccountState, SafetyGovernor};
use super::route::{RouteId, SettlementEntry};
use super::selector::TradeDecision;
use crate::audit::{AuditRecord, TradeAuditLog};
use crate::chain::{ChainClient, ChainError};
use crate::config::TradeSizes;
use crate::types::TokenPair;
use alloy::primitives::{TxHash, U256};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoProfit,
    NoCollateral,
    TradeLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    /// Every check passed; not submitted because live mode is off
    DryRun {
        entry: SettlementEntry,
        amount_in: U256,
    },
    Submitted(TxHash),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("trade size for route {0} is zero")]
    ZeroTradeSize(RouteId),
    #[error("collateral check failed: {0}")]
    Collateral(#[source] ChainError),
    #[error(transparent)]
    Submission(ChainError),
}

pub struct TradeDispatcher {
    chain: Arc<dyn ChainClient>,
    tokens: TokenPair,
    trade_sizes: TradeSizes,
    live: bool,
    audit: Option<TradeAuditLog>,
    reference_symbol: String,
}

impl TradeDispatcher {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        tokens: TokenPair,
        trade_sizes: TradeSizes,
        live: bool,
        reference_symbol: String,
    ) -> Self {
        Self {
            chain,
            tokens,
            trade_sizes,
            live,
            audit: None,
            reference_symbol,
        }
    }

    pub fn with_audit_log(mut self, audit: TradeAuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub async fn dispatch(
        &self,
        decision: &TradeDecision,
        state: &mut AccountState,
        governor: &SafetyGovernor,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let route = decision.route;

        if !decision.execute {
            info!(
                route = %route,
                net_profit = %decision.net_profit,
                "Best route {} not profitable ({} {}), no trade",
                route, decision.net_profit, self.reference_symbol
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoProfit));
        }

        if !governor.permits_trade(state) {
            warn!(
                "Daily trade limit reached ({}/{}), skipping route {}",
                state.trade_count,
                governor.max_trades_per_day(),
                route
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::TradeLimit));
        }

        let entry = route.entry_point();
        let amount_in = self.trade_sizes.for_side(entry.family());
        if amount_in.is_zero() {
            error!("Trade size is 0 for {}-based route {}", entry.family(), route);
            return Err(DispatchError::ZeroTradeSize(route));
        }

        let collateral = self.tokens.token(entry.family());
        let balance = self
            .chain
            .collateral_balance(collateral.address)
            .await
            .map_err(DispatchError::Collateral)?;
        if balance.is_zero() {
            warn!(
                route = %route,
                "Settlement contract has no {} collateral, skipping {}",
                collateral.symbol, entry
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoCollateral));
        }

        if !self.live {
            info!(
                route = %route,
                entry = %entry,
                "[DRY RUN] would call {}({}) for route {} ({}), expected net profit {} {}",
                entry,
                amount_in,
                route,
                route.describe(),
                decision.net_profit,
                self.reference_symbol
            );
            return Ok(DispatchOutcome::DryRun { entry, amount_in });
        }

        info!("Executing route {} via {}({}): {}", route, entry, amount_in, route.describe());
        let tx_hash = match self.chain.submit_settlement(entry, amount_in).await {
            Ok(hash) => hash,
            Err(e) => {
                error!(
                    route = %route,
                    entry = %entry,
                    "Settlement submission failed (pair {}, amount {}): {}",
                    self.tokens.symbol(),
                    amount_in,
                    e
                );
                return Err(DispatchError::Submission(e));
            }
        };

        governor.record_trade(state);
        info!(
            target: "audit",
            route = %route,
            entry = %entry,
            tx_hash = %tx_hash,
            net_profit = %decision.net_profit,
            trade_count = state.trade_count,
            "Settlement transaction sent"
        );

        if let Some(audit) = &self.audit {
            let record = AuditRecord::new(
                now,
                self.tokens.symbol(),
                route,
                entry,
                amount_in,
                decision.net_profit,
                self.reference_symbol.clone(),
                tx_hash,
                state.trade_count,
            );
            if let Err(e) = audit.append(&record) {
                warn!("Failed to write audit record for {}: {:#}", tx_hash, e);
            }
        }

        Ok(DispatchOutcome::Submitted(tx_hash))
    }
}
