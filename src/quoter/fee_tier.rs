//! Uniswap V3 fee-tier quoter
//!
//! QuoterV1 `quoteExactInputSingle` is issued once per fee tier as an
//! eth_call. A tier that reverts (no pool, no liquidity, tick overflow) is
//! logged and skipped; the quote fails only when no tier answers.

use super::{Quote, QuoteError, QuoteSource, Venue};
use crate::contracts::IQuoter;
use crate::types::TokenDescriptor;
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Uniswap V3 fee tiers, cheapest first
pub const UNISWAP_V3_FEE_TIERS: [u32; 4] = [
    100,   // 0.01%
    500,   // 0.05%
    3000,  // 0.30%
    10000, // 1.00%
];

/// Helper: convert u32 fee tier to alloy uint24 for contract calls.
/// Tiers are validated to fit 24 bits when the config is loaded.
fn fee_to_u24(fee: u32) -> U24 {
    debug_assert!(fee <= 0xFFFFFF, "fee {} exceeds U24 max (16777215)", fee);
    U24::from_limbs([u64::from(fee)])
}

/// Keep the largest non-zero output across tier attempts, ignoring failures.
///
/// On equal outputs the earlier tier wins.
pub fn best_tier<E>(attempts: impl IntoIterator<Item = (u32, Result<U256, E>)>) -> Option<(U256, u32)> {
    attempts
        .into_iter()
        .filter_map(|(fee, result)| result.ok().filter(|out| !out.is_zero()).map(|out| (out, fee)))
        .fold(None, |best, (out, fee)| match best {
            Some((best_out, _)) if best_out >= out => best,
            _ => Some((out, fee)),
        })
}

/// Venue-1 quote provider
pub struct FeeTierQuoter<P> {
    provider: Arc<P>,
    quoter_address: Address,
    fee_tiers: Vec<u32>,
}

impl<P: Provider + 'static> FeeTierQuoter<P> {
    pub fn new(provider: Arc<P>, quoter_address: Address, fee_tiers: Vec<u32>) -> Self {
        Self {
            provider,
            quoter_address,
            fee_tiers,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> QuoteSource for FeeTierQuoter<P> {
    fn venue(&self) -> Venue {
        Venue::UniswapV3
    }

    async fn quote(
        &self,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
    ) -> Result<Quote, QuoteError> {
        let quoter = IQuoter::new(self.quoter_address, self.provider.clone());

        let mut attempts = Vec::with_capacity(self.fee_tiers.len());
        for &fee in &self.fee_tiers {
            let result = quoter
                .quoteExactInputSingle(
                    token_in.address,
                    token_out.address,
                    fee_to_u24(fee),
                    amount_in,
                    U160::ZERO,
                )
                .call()
                .await;

            match &result {
                Ok(out) => debug!(
                    "Fee tier {}: {} {} -> {} {}",
                    fee, amount_in, token_in.symbol, out, token_out.symbol
                ),
                Err(e) => warn!(
                    "Fee tier {} failed for {} {} -> {}: {}",
                    fee, amount_in, token_in.symbol, token_out.symbol, e
                ),
            }
            attempts.push((fee, result));
        }

        let (best_out, fee) = best_tier(attempts).ok_or_else(|| QuoteError::NoLiquidity {
            venue: Venue::UniswapV3,
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            amount_in,
        })?;

        let amount_out = token_out.to_human(best_out)?;
        debug!(
            "Best fee tier {} for {} -> {}: {}",
            fee, token_in.symbol, token_out.symbol, amount_out
        );

        Ok(Quote {
            venue: Venue::UniswapV3,
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            amount_in,
            amount_out,
            fee_tier: Some(fee),
        })
    }
}
