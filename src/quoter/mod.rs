//! Quote Providers
//!
//! Read-only price lookups against the two venues. Each provider answers
//! "how much `token_out` do I get for `amount_in` of `token_in`" and either
//! returns a fresh `Quote` or a `QuoteError`. Quotes are never cached:
//! every cycle asks again.
//!
//! - `FeeTierQuoter`: Uniswap V3 QuoterV1, tries every configured fee tier
//!   and keeps the best output.
//! - `PathQuoter`: SushiSwap router `getAmountsOut` over a fixed two-token path.

pub mod fee_tier;
pub mod path;

pub use fee_tier::{best_tier, FeeTierQuoter, UNISWAP_V3_FEE_TIERS};
pub use path::PathQuoter;

use crate::types::{AmountError, HumanAmount, TokenDescriptor};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// The two liquidity venues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Venue {
    /// Venue-1: single-hop exact-input quotes across fee tiers
    UniswapV3,
    /// Venue-2: path-based amounts-out quotes
    SushiSwap,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Venue::UniswapV3 => write!(f, "UniswapV3"),
            Venue::SushiSwap => write!(f, "SushiSwap"),
        }
    }
}

/// A venue's non-binding answer for one input amount
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub venue: Venue,
    pub token_in: String,
    pub token_out: String,
    /// Input in `token_in` base units
    pub amount_in: U256,
    /// Output in human-readable `token_out` units
    pub amount_out: HumanAmount,
    /// Fee tier (hundredths of a bip) that produced `amount_out`, fee-tier venues only
    pub fee_tier: Option<u32>,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("{venue}: no fee tier quoted {amount_in} {token_in} -> {token_out}")]
    NoLiquidity {
        venue: Venue,
        token_in: String,
        token_out: String,
        amount_in: U256,
    },
    #[error("{venue}: quote call for {amount_in} {token_in} -> {token_out} failed: {message}")]
    Rpc {
        venue: Venue,
        token_in: String,
        token_out: String,
        amount_in: U256,
        message: String,
    },
    #[error("quote output conversion failed: {0}")]
    Amount(#[from] AmountError),
}

/// Anything that can price a single hop
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn venue(&self) -> Venue;

    async fn quote(
        &self,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
    ) -> Result<Quote, QuoteError>;
}
