//! Arbitrage Module
//!
//! The round-trip decision engine: route simulation, gas estimation,
//! profit normalization, route selection, dispatch, and the safety governor.

pub mod dispatcher;
pub mod engine;
pub mod gas;
pub mod governor;
pub mod normalizer;
pub mod route;
pub mod selector;
pub mod simulator;

#[cfg(test)]
pub(crate) mod mock;

pub use dispatcher::{DispatchError, DispatchOutcome, SkipReason, TradeDispatcher};
pub use engine::{ArbitrageEngine, CycleReport};
pub use gas::{GasCostEstimator, GasEstimate};
pub use governor::{AccountState, SafetyGovernor};
pub use normalizer::{NormalizedProfits, ProfitNormalizer};
pub use route::{RouteId, RouteResult, SettlementEntry};
pub use selector::{select, TradeDecision};
pub use simulator::{RouteSimulator, SimulationError};
