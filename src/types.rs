//! Core data structures
//!
//! Token descriptors and the exact raw <-> human amount conversions every
//! other module goes through. Amounts shown to humans (and compared across
//! routes) are `rust_decimal::Decimal`; amounts sent on-chain are `U256`
//! base units.

use alloy::primitives::{Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Human-readable token amount (base units scaled down by the token's decimals)
pub type HumanAmount = Decimal;

/// Largest decimal precision `Decimal` can represent exactly
pub const MAX_TOKEN_DECIMALS: u8 = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("{symbol}: raw amount {raw} does not fit a decimal with {decimals} decimals")]
    RawOverflow { symbol: String, raw: U256, decimals: u8 },
    #[error("{symbol}: human amount {amount} overflows base units")]
    HumanOverflow { symbol: String, amount: Decimal },
    #[error("{symbol}: negative amount {amount} has no base-unit representation")]
    Negative { symbol: String, amount: Decimal },
    #[error("{symbol}: {decimals} decimals exceeds the supported maximum of 28")]
    UnsupportedDecimals { symbol: String, decimals: u8 },
}

/// Which side of the configured pair a token sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Token X (MAGIC in the reference deployment)
    Base,
    /// Token Y (USDC in the reference deployment)
    Quote,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Base => Side::Quote,
            Side::Quote => Side::Base,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Base => write!(f, "base"),
            Side::Quote => write!(f, "quote"),
        }
    }
}

/// A token as configured for this process. Decimals never change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(symbol: impl Into<String>, address: Address, decimals: u8) -> Result<Self, AmountError> {
        let symbol = symbol.into();
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(AmountError::UnsupportedDecimals { symbol, decimals });
        }
        Ok(Self {
            symbol,
            address,
            decimals,
        })
    }

    /// One whole token in base units (10^decimals)
    pub fn one_unit(&self) -> U256 {
        U256::from(10u64).pow(U256::from(self.decimals))
    }

    /// Base units -> human amount. Exact: the result carries `decimals` fractional digits.
    pub fn to_human(&self, raw: U256) -> Result<HumanAmount, AmountError> {
        let overflow = || AmountError::RawOverflow {
            symbol: self.symbol.clone(),
            raw,
            decimals: self.decimals,
        };
        let raw_u128 = u128::try_from(raw).map_err(|_| overflow())?;
        let raw_i128 = i128::try_from(raw_u128).map_err(|_| overflow())?;
        Decimal::try_from_i128_with_scale(raw_i128, u32::from(self.decimals)).map_err(|_| overflow())
    }

    /// Human amount -> base units, truncating anything finer than one base unit.
    pub fn to_base_units(&self, amount: HumanAmount) -> Result<U256, AmountError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AmountError::Negative {
                symbol: self.symbol.clone(),
                amount,
            });
        }
        let overflow = || AmountError::HumanOverflow {
            symbol: self.symbol.clone(),
            amount,
        };
        let scale = Decimal::try_from_i128_with_scale(10i128.pow(u32::from(self.decimals)), 0)
            .map_err(|_| overflow())?;
        let scaled = amount.checked_mul(scale).ok_or_else(overflow)?.trunc();
        let raw = scaled.to_u128().ok_or_else(overflow)?;
        Ok(U256::from(raw))
    }
}

impl fmt::Display for TokenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// The single token pair this bot trades, plus the chain's wrapped native token
/// (used only to price gas).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub base: TokenDescriptor,
    pub quote: TokenDescriptor,
    pub native: TokenDescriptor,
}

impl TokenPair {
    pub fn token(&self, side: Side) -> &TokenDescriptor {
        match side {
            Side::Base => &self.base,
            Side::Quote => &self.quote,
        }
    }

    /// "MAGIC/USDC"
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base.symbol, self.quote.symbol)
    }
}
