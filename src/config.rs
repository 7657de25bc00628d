//! Configuration management
//!
//! Two layers:
//! - env file (`.env` by default): RPC endpoint, signing key, settlement
//!   contract address, live/dry-run switch, audit log directory.
//! - pair file (TOML): tokens, venue addresses, trade sizes, fee tiers,
//!   gas and polling parameters, safety governor limits.
//!
//! Every pair-file field defaults to the reference deployment
//! (MAGIC/USDC on Arbitrum One), so an empty file is a valid config.
//! All values are immutable for the lifetime of the process.

use crate::quoter::UNISWAP_V3_FEE_TIERS;
use crate::types::{AmountError, Side, TokenDescriptor, TokenPair};
use alloy::primitives::{address, Address, U256};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Token(#[from] AmountError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ── Pair file (TOML) ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokensSection {
    pub base: TokenEntry,
    pub quote: TokenEntry,
    /// Wrapped native token, used to price gas
    pub native: TokenEntry,
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            base: TokenEntry {
                symbol: "MAGIC".to_string(),
                address: address!("539bdE0d7Dbd336b79148AA742883198BBF60342"),
                decimals: 18,
            },
            quote: TokenEntry {
                symbol: "USDC".to_string(),
                address: address!("FF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"),
                decimals: 6,
            },
            native: TokenEntry {
                symbol: "WETH".to_string(),
                address: address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
                decimals: 18,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VenuesSection {
    pub uniswap_v3_quoter: Address,
    pub sushiswap_router: Address,
    pub sushiswap_factory: Address,
}

impl Default for VenuesSection {
    fn default() -> Self {
        Self {
            uniswap_v3_quoter: address!("b27308f9F90D607463bb33eA1BeBb41C27CE5AB6"),
            sushiswap_router: address!("1b02dA8Cb0d097eB8D57A175b88c7D8b47997506"),
            sushiswap_factory: address!("c35DADB65012eC5796536bD9864eD8773aBc74C4"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingSection {
    /// Trade size for base-starting routes, base units (decimal string, `_`/`,` allowed)
    pub base_trade_size: String,
    /// Trade size for quote-starting routes, base units
    pub quote_trade_size: String,
    pub fee_tiers: Vec<u32>,
    /// Currency all route profits are compared in
    pub reference: Side,
    /// Gas units assumed for one settlement transaction
    pub settlement_gas_units: u64,
    /// Multiplier applied to the network gas price when submitting
    pub gas_multiplier: f64,
    pub poll_interval_secs: u64,
}

impl Default for TradingSection {
    fn default() -> Self {
        Self {
            base_trade_size: "50000000".to_string(),
            quote_trade_size: "10000000".to_string(),
            fee_tiers: UNISWAP_V3_FEE_TIERS.to_vec(),
            reference: Side::Quote,
            settlement_gas_units: 80_000,
            gas_multiplier: 1.3,
            poll_interval_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SafetySection {
    pub max_trades_per_day: u32,
    pub reset_period_hours: u64,
    /// Block dispatch once `max_trades_per_day` is reached. Off by default:
    /// the counter is advisory unless an operator opts in.
    pub enforce_trade_limit: bool,
}

impl Default for SafetySection {
    fn default() -> Self {
        Self {
            max_trades_per_day: 10,
            reset_period_hours: 24,
            enforce_trade_limit: false,
        }
    }
}

/// Raw pair file as deserialized from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PairFile {
    pub tokens: TokensSection,
    pub venues: VenuesSection,
    pub trading: TradingSection,
    pub safety: SafetySection,
}

/// Trade size per starting-token family, in base units.
///
/// The simulator and the dispatcher both read sizes from this one value, so a
/// simulated route and its settlement transaction always use the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSizes {
    pub base: U256,
    pub quote: U256,
}

impl TradeSizes {
    pub fn for_side(&self, side: Side) -> U256 {
        match side {
            Side::Base => self.base,
            Side::Quote => self.quote,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafetyConfig {
    pub max_trades_per_day: u32,
    pub reset_period: chrono::Duration,
    pub enforce_trade_limit: bool,
}

/// Validated pair configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PairConfig {
    pub tokens: TokenPair,
    pub uniswap_v3_quoter: Address,
    pub sushiswap_router: Address,
    pub sushiswap_factory: Address,
    pub trade_sizes: TradeSizes,
    pub fee_tiers: Vec<u32>,
    pub reference: Side,
    pub settlement_gas_units: u64,
    pub gas_multiplier: f64,
    pub poll_interval: Duration,
    pub safety: SafetyConfig,
}

fn parse_base_units(field: &'static str, value: &str) -> Result<U256, ConfigError> {
    let cleaned: String = value.chars().filter(|c| *c != '_' && *c != ',').collect();
    let amount = U256::from_str_radix(cleaned.trim(), 10).map_err(|e| invalid(field, e.to_string()))?;
    if amount.is_zero() {
        return Err(invalid(field, "trade size must be non-zero"));
    }
    Ok(amount)
}

fn token(entry: &TokenEntry) -> Result<TokenDescriptor, ConfigError> {
    Ok(TokenDescriptor::new(entry.symbol.clone(), entry.address, entry.decimals)?)
}

impl PairFile {
    pub fn validate(self) -> Result<PairConfig, ConfigError> {
        let tokens = TokenPair {
            base: token(&self.tokens.base)?,
            quote: token(&self.tokens.quote)?,
            native: token(&self.tokens.native)?,
        };
        if tokens.base.address == tokens.quote.address {
            return Err(invalid("tokens", "base and quote must be different tokens"));
        }

        let trade_sizes = TradeSizes {
            base: parse_base_units("trading.base_trade_size", &self.trading.base_trade_size)?,
            quote: parse_base_units("trading.quote_trade_size", &self.trading.quote_trade_size)?,
        };

        if self.trading.fee_tiers.is_empty() {
            return Err(invalid("trading.fee_tiers", "at least one fee tier is required"));
        }
        if let Some(fee) = self.trading.fee_tiers.iter().find(|f| **f > 0xFF_FFFF) {
            return Err(invalid("trading.fee_tiers", format!("{} does not fit uint24", fee)));
        }
        if !self.trading.gas_multiplier.is_finite() || self.trading.gas_multiplier < 1.0 {
            return Err(invalid("trading.gas_multiplier", "must be a finite value >= 1.0"));
        }
        if self.trading.settlement_gas_units == 0 {
            return Err(invalid("trading.settlement_gas_units", "must be non-zero"));
        }
        if self.trading.poll_interval_secs == 0 {
            return Err(invalid("trading.poll_interval_secs", "must be non-zero"));
        }
        if self.safety.reset_period_hours == 0 {
            return Err(invalid("safety.reset_period_hours", "must be non-zero"));
        }
        let reset_period = i64::try_from(self.safety.reset_period_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| invalid("safety.reset_period_hours", "out of range"))?;

        Ok(PairConfig {
            tokens,
            uniswap_v3_quoter: self.venues.uniswap_v3_quoter,
            sushiswap_router: self.venues.sushiswap_router,
            sushiswap_factory: self.venues.sushiswap_factory,
            trade_sizes,
            fee_tiers: self.trading.fee_tiers,
            reference: self.trading.reference,
            settlement_gas_units: self.trading.settlement_gas_units,
            gas_multiplier: self.trading.gas_multiplier,
            poll_interval: Duration::from_secs(self.trading.poll_interval_secs),
            safety: SafetyConfig {
                max_trades_per_day: self.safety.max_trades_per_day,
                reset_period,
                enforce_trade_limit: self.safety.enforce_trade_limit,
            },
        })
    }
}

/// Load and validate a pair file
pub fn load_pair_config<P: AsRef<Path>>(path: P) -> Result<PairConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read pair config: {}", path.as_ref().display()))?;
    let file: PairFile =
        toml::from_str(&content).with_context(|| "Failed to parse pair TOML configuration")?;
    file.validate()
        .with_context(|| format!("Invalid pair config: {}", path.as_ref().display()))
}

// ── Env file ─────────────────────────────────────────────────────────

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,

    // Wallet
    pub private_key: String,
    /// Expected signer address; checked against the key at startup when set
    pub wallet_address: Option<Address>,

    // Settlement
    pub settlement_contract: Address,
    /// false = dry run: every check runs but nothing is submitted
    pub live_mode: bool,
    pub audit_log_dir: PathBuf,

    pub pair: PairConfig,
}

impl BotConfig {
    /// First 40 characters of the RPC URL, for startup logging without the API key
    pub fn rpc_url_preview(&self) -> String {
        self.rpc_url.chars().take(40).collect()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(name, e.to_string())),
        _ => Ok(None),
    }
}

/// Build a `BotConfig` from the process environment and an already-loaded pair config
pub fn config_from_env(pair: PairConfig) -> Result<BotConfig, ConfigError> {
    let settlement_contract = required("ARBITRAGE_CONTRACT_ADDRESS")?
        .trim()
        .parse::<Address>()
        .map_err(|e| invalid("ARBITRAGE_CONTRACT_ADDRESS", e.to_string()))?;

    Ok(BotConfig {
        rpc_url: required("RPC_URL")?,
        private_key: required("PRIVATE_KEY")?,
        wallet_address: optional("WALLET_ADDRESS")?,
        settlement_contract,
        live_mode: optional("LIVE_MODE")?.unwrap_or(false),
        audit_log_dir: optional::<PathBuf>("AUDIT_LOG_DIR")?
            .unwrap_or_else(|| PathBuf::from("data/audit")),
        pair,
    })
}

/// Load the env file (missing file is fine, variables may already be set)
/// and the pair file.
pub fn load_config_from_file<E: AsRef<Path>, P: AsRef<Path>>(env_file: E, pair_file: P) -> Result<BotConfig> {
    dotenv::from_path(env_file.as_ref()).ok();
    let pair = load_pair_config(pair_file)?;
    Ok(config_from_env(pair)?)
}
