//! Round-trip DEX arbitrage bot library
//!
//! Watches one token pair on two venues (Uniswap V3 and SushiSwap), prices
//! four fixed round trips each cycle, and triggers an on-chain settlement
//! contract when the best route is profitable net of gas.

pub mod arbitrage;
pub mod audit;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod logging;
pub mod quoter;
pub mod types;

// Re-export commonly used types
pub use arbitrage::{AccountState, ArbitrageEngine, RouteId, SafetyGovernor, TradeDecision};
pub use config::{load_config_from_file, BotConfig, PairConfig, TradeSizes};
pub use types::{HumanAmount, Side, TokenDescriptor, TokenPair};
