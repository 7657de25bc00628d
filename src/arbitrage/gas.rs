//! Gas Cost Estimator
//!
//! `settlement_gas_units * gas_price` in native currency, converted to the
//! reference currency with a fee-tier quote for one native unit.
//!
//! Fails open: if either the gas price or the conversion quote is
//! unavailable, the estimate is zero with `rate_available = false`. Gas is
//! a correction to the profit figure, not the profitability gate, so a
//! missing rate never blocks the cycle.

use crate::chain::ChainClient;
use crate::quoter::QuoteSource;
use crate::types::{HumanAmount, TokenDescriptor};
use alloy::primitives::U256;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasEstimate {
    /// Settlement cost in the reference currency
    pub cost: HumanAmount,
    /// false = `cost` is the fail-open zero, not a measured figure
    pub rate_available: bool,
}

impl GasEstimate {
    pub fn unavailable() -> Self {
        Self {
            cost: HumanAmount::ZERO,
            rate_available: false,
        }
    }
}

pub struct GasCostEstimator {
    chain: Arc<dyn ChainClient>,
    rate_source: Arc<dyn QuoteSource>,
    native: TokenDescriptor,
    reference: TokenDescriptor,
    gas_units: u64,
}

impl GasCostEstimator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        rate_source: Arc<dyn QuoteSource>,
        native: TokenDescriptor,
        reference: TokenDescriptor,
        gas_units: u64,
    ) -> Self {
        Self {
            chain,
            rate_source,
            native,
            reference,
            gas_units,
        }
    }

    pub async fn estimate(&self) -> GasEstimate {
        let gas_price = match self.chain.gas_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!("Gas price unavailable, assuming zero gas cost: {}", e);
                return GasEstimate::unavailable();
            }
        };

        let fee_wei = U256::from(self.gas_units) * U256::from(gas_price);
        let fee_native = match self.native.to_human(fee_wei) {
            Ok(fee) => fee,
            Err(e) => {
                warn!("Gas fee conversion failed, assuming zero gas cost: {}", e);
                return GasEstimate::unavailable();
            }
        };

        let rate = match self
            .rate_source
            .quote(&self.native, &self.reference, self.native.one_unit())
            .await
        {
            Ok(quote) => quote.amount_out,
            Err(e) => {
                warn!(
                    "{} -> {} rate unavailable, assuming zero gas cost: {}",
                    self.native.symbol, self.reference.symbol, e
                );
                return GasEstimate::unavailable();
            }
        };

        let cost = fee_native * rate;
        debug!(
            "Gas estimate: {} units x {} wei = {} {} = {} {}",
            self.gas_units, gas_price, fee_native, self.native.symbol, cost, self.reference.symbol
        );
        GasEstimate {
            cost,
            rate_available: true,
        }
    }
}
