//! Decision loop
//!
//! One cycle: governor reset check, simulate all routes, estimate gas,
//! normalize, select, dispatch. Cycles run back to back with a fixed sleep
//! in between and never overlap; `AccountState` is owned by the caller and
//! threaded through every cycle.

use super::dispatcher::{DispatchError, DispatchOutcome, SkipReason, TradeDispatcher};
use super::gas::{GasCostEstimator, GasEstimate};
use super::governor::{AccountState, SafetyGovernor};
use super::normalizer::{NormalizedProfits, ProfitNormalizer};
use super::route::RouteId;
use super::selector::{select, TradeDecision};
use super::simulator::RouteSimulator;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{error, info};

/// Everything one cycle computed, for logging and tests
#[derive(Debug)]
pub struct CycleReport {
    pub gas: GasEstimate,
    pub profits: NormalizedProfits,
    /// `None` = no route had a value
    pub decision: Option<TradeDecision>,
    /// `None` when there was no decision to dispatch
    pub dispatch: Option<Result<DispatchOutcome, DispatchError>>,
}

impl CycleReport {
    /// One-word verdict for the cycle summary line. A best route with no
    /// positive profit counts as no opportunity.
    pub fn verdict(&self) -> &'static str {
        match &self.dispatch {
            None | Some(Ok(DispatchOutcome::Skipped(SkipReason::NoProfit))) => "no-opportunity",
            Some(Ok(DispatchOutcome::Skipped(_))) => "skipped",
            Some(Ok(DispatchOutcome::DryRun { .. })) => "dry-run",
            Some(Ok(DispatchOutcome::Submitted(_))) => "submitted",
            Some(Err(_)) => "dispatch-failed",
        }
    }
}

pub struct ArbitrageEngine {
    simulator: RouteSimulator,
    gas: GasCostEstimator,
    normalizer: ProfitNormalizer,
    dispatcher: TradeDispatcher,
    governor: SafetyGovernor,
    reference_symbol: String,
}

impl ArbitrageEngine {
    pub fn new(
        simulator: RouteSimulator,
        gas: GasCostEstimator,
        normalizer: ProfitNormalizer,
        dispatcher: TradeDispatcher,
        governor: SafetyGovernor,
        reference_symbol: String,
    ) -> Self {
        Self {
            simulator,
            gas,
            normalizer,
            dispatcher,
            governor,
            reference_symbol,
        }
    }

    pub fn governor(&self) -> &SafetyGovernor {
        &self.governor
    }

    pub async fn run_cycle(&self, state: &mut AccountState, now: DateTime<Utc>) -> CycleReport {
        self.governor.reset_if_due(state, now);

        let gross = self.simulator.simulate_all().await;
        let gas = self.gas.estimate().await;
        let profits = self.normalizer.normalize(&gross, &gas).await;

        for route in RouteId::ALL {
            match profits.get(&route).copied().flatten() {
                Some(net) => info!(
                    route = %route,
                    net_profit = %net,
                    "Route {}: net profit {} {}",
                    route, net, self.reference_symbol
                ),
                None => info!(route = %route, "Route {}: unavailable", route),
            }
        }

        let decision = select(&profits);
        let dispatch = match &decision {
            None => {
                info!("No valid arbitrage route available this cycle");
                None
            }
            Some(decision) => {
                info!(
                    route = %decision.route,
                    net_profit = %decision.net_profit,
                    execute = decision.execute,
                    "Best route {} with net profit {} {}",
                    decision.route, decision.net_profit, self.reference_symbol
                );
                let result = self.dispatcher.dispatch(decision, state, &self.governor, now).await;
                if let Err(e) = &result {
                    error!(route = %decision.route, "Dispatch failed: {}", e);
                }
                Some(result)
            }
        };

        CycleReport {
            gas,
            profits,
            decision,
            dispatch,
        }
    }

    /// Poll until Ctrl-C. Every failure inside a cycle is logged and the
    /// next cycle simply tries again.
    pub async fn run(&self, state: &mut AccountState, poll_interval: Duration) {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let report = self.run_cycle(state, Utc::now()).await;
            info!(
                cycle,
                verdict = report.verdict(),
                trade_count = state.trade_count,
                gas_rate_available = report.gas.rate_available,
                "Cycle {} complete: {} (trades this period: {}, next reset {})",
                cycle,
                report.verdict(),
                state.trade_count,
                state.next_reset.format("%Y-%m-%d %H:%M:%S UTC")
            );

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping after {} cycles", cycle);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::mock::{pair, sizes, MockChainClient, MockQuoteSource};
    use crate::arbitrage::route::SettlementEntry;
    use crate::config::SafetyConfig;
    use crate::quoter::Venue;
    use crate::types::Side;
    use alloy::primitives::U256;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    /// 100 MAGIC -> 105 USDC on Uniswap, 105 USDC -> 103 MAGIC on SushiSwap.
    /// Only these exact inputs are priced, so routes B..D are unavailable.
    fn magic_round_trip() -> (MockQuoteSource, MockQuoteSource) {
        let uni = MockQuoteSource::new(Venue::UniswapV3).with_exact("MAGIC", "USDC", sizes().base, dec!(105));
        let sushi = MockQuoteSource::new(Venue::SushiSwap).with_exact(
            "USDC",
            "MAGIC",
            U256::from(105_000_000u64),
            dec!(103),
        );
        (uni, sushi)
    }

    struct Harness {
        engine: ArbitrageEngine,
        chain: Arc<MockChainClient>,
    }

    /// Gas price 1 gwei x 80k units = 0.00008 WETH; at 12500 USDC/WETH that is 1 USDC.
    /// MAGIC -> USDC conversion rate is 1.
    fn harness(uni: MockQuoteSource, sushi: MockQuoteSource) -> Harness {
        let tokens = pair();
        let mut chain = MockChainClient::new()
            .with_balance(tokens.base.address, U256::from(1_000u64))
            .with_balance(tokens.quote.address, U256::from(1_000u64));
        chain.gas_price = Some(1_000_000_000);
        let chain = Arc::new(chain);

        let rates = Arc::new(
            MockQuoteSource::new(Venue::UniswapV3)
                .with("WETH", "USDC", dec!(12500))
                .with("MAGIC", "USDC", dec!(1)),
        );

        let governor = SafetyGovernor::new(&SafetyConfig {
            max_trades_per_day: 10,
            reset_period: ChronoDuration::hours(24),
            enforce_trade_limit: false,
        });

        let engine = ArbitrageEngine::new(
            RouteSimulator::new(Arc::new(uni), Arc::new(sushi), tokens.clone(), sizes()),
            GasCostEstimator::new(chain.clone(), rates.clone(), tokens.native.clone(), tokens.quote.clone(), 80_000),
            ProfitNormalizer::new(rates, tokens.clone(), Side::Quote),
            TradeDispatcher::new(chain.clone(), tokens, sizes(), true, "USDC".to_string()),
            governor,
            "USDC".to_string(),
        );
        Harness { engine, chain }
    }

    #[tokio::test]
    async fn test_profitable_round_trip_is_dispatched() {
        let (uni, sushi) = magic_round_trip();
        let h = harness(uni, sushi);
        let mut state = h.engine.governor().initial_state(t0());

        let report = h.engine.run_cycle(&mut state, t0()).await;

        assert_eq!(report.gas.cost, dec!(1));
        assert_eq!(report.profits[&RouteId::A], Some(dec!(2)));
        let decision = report.decision.unwrap();
        assert_eq!(decision.route, RouteId::A);
        assert!(decision.execute);
        assert_eq!(h.chain.submitted(), vec![(SettlementEntry::BaseForward, sizes().base)]);
        assert_eq!(state.trade_count, 1);
        assert_eq!(report.verdict(), "submitted");
    }

    #[tokio::test]
    async fn test_failed_venue_leaves_no_opportunity() {
        let (uni, _) = magic_round_trip();
        let sushi = MockQuoteSource::new(Venue::SushiSwap);
        let h = harness(uni, sushi);
        let mut state = h.engine.governor().initial_state(t0());

        let report = h.engine.run_cycle(&mut state, t0()).await;

        assert!(report.profits.values().all(Option::is_none));
        assert!(report.decision.is_none());
        assert!(report.dispatch.is_none());
        assert!(h.chain.submitted().is_empty());
        assert_eq!(state.trade_count, 0);
        assert_eq!(report.verdict(), "no-opportunity");
    }

    #[tokio::test]
    async fn test_all_routes_unprofitable_no_dispatch() {
        let uni = MockQuoteSource::new(Venue::UniswapV3)
            .with("MAGIC", "USDC", dec!(99))
            .with("USDC", "MAGIC", dec!(99));
        let sushi = MockQuoteSource::new(Venue::SushiSwap)
            .with("MAGIC", "USDC", dec!(99))
            .with("USDC", "MAGIC", dec!(99));
        let h = harness(uni, sushi);
        let mut state = h.engine.governor().initial_state(t0());

        let report = h.engine.run_cycle(&mut state, t0()).await;

        assert!(report
            .profits
            .values()
            .all(|p| p.map(|v| v <= dec!(0)).unwrap_or(false)));
        assert!(!report.decision.unwrap().execute);
        assert!(matches!(
            report.dispatch,
            Some(Ok(DispatchOutcome::Skipped(SkipReason::NoProfit)))
        ));
        assert!(h.chain.submitted().is_empty());
        assert_eq!(state.trade_count, 0);
        assert_eq!(report.verdict(), "no-opportunity");
    }

    #[test]
    fn test_verdict_keeps_skipped_for_blocked_trades() {
        let report = |reason| CycleReport {
            gas: GasEstimate::unavailable(),
            profits: NormalizedProfits::new(),
            decision: None,
            dispatch: Some(Ok(DispatchOutcome::Skipped(reason))),
        };
        assert_eq!(report(SkipReason::NoCollateral).verdict(), "skipped");
        assert_eq!(report(SkipReason::TradeLimit).verdict(), "skipped");
        assert_eq!(report(SkipReason::NoProfit).verdict(), "no-opportunity");
    }

    #[tokio::test]
    async fn test_counter_resets_before_simulation() {
        let (uni, sushi) = magic_round_trip();
        let h = harness(uni, sushi);
        let mut state = h.engine.governor().initial_state(t0());
        state.trade_count = 7;

        let later = t0() + ChronoDuration::hours(25);
        h.engine.run_cycle(&mut state, later).await;

        // reset to 0, then one successful dispatch
        assert_eq!(state.trade_count, 1);
        assert_eq!(state.next_reset, t0() + ChronoDuration::hours(48));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_not_fatal() {
        let (uni, sushi) = magic_round_trip();
        let tokens = pair();
        let mut chain = MockChainClient::new().with_balance(tokens.base.address, U256::from(1u64));
        chain.fail_submission = true;
        let chain = Arc::new(chain);
        let rates = Arc::new(MockQuoteSource::new(Venue::UniswapV3).with("MAGIC", "USDC", dec!(1)));
        let governor = SafetyGovernor::new(&SafetyConfig {
            max_trades_per_day: 10,
            reset_period: ChronoDuration::hours(24),
            enforce_trade_limit: false,
        });
        let engine = ArbitrageEngine::new(
            RouteSimulator::new(Arc::new(uni), Arc::new(sushi), tokens.clone(), sizes()),
            GasCostEstimator::new(chain.clone(), rates.clone(), tokens.native.clone(), tokens.quote.clone(), 80_000),
            ProfitNormalizer::new(rates, tokens.clone(), Side::Quote),
            TradeDispatcher::new(chain, tokens, sizes(), true, "USDC".to_string()),
            governor,
            "USDC".to_string(),
        );
        let mut state = engine.governor().initial_state(t0());

        // gas rate missing: fails open to zero, route A gross 3
        let report = engine.run_cycle(&mut state, t0()).await;
        assert!(!report.gas.rate_available);
        assert_eq!(report.profits[&RouteId::A], Some(dec!(3)));
        assert!(matches!(report.dispatch, Some(Err(DispatchError::Submission(_)))));
        assert_eq!(state.trade_count, 0);

        // the next cycle runs normally
        let report = engine.run_cycle(&mut state, t0()).await;
        assert_eq!(report.verdict(), "dispatch-failed");
    }
}
