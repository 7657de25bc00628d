//! Route Simulator
//!
//! Prices each of the four round trips with two sequential quotes. Hop 2's
//! input is hop 1's output converted back to base units with the
//! intermediate token's decimals, so both hops see exactly what the
//! settlement contract would trade. The result is `hop2_output - initial`
//! in the starting token, or `None` when either hop failed.

use super::route::{RouteId, RouteResult};
use crate::config::TradeSizes;
use crate::quoter::{QuoteError, QuoteSource, Venue};
use crate::types::{AmountError, HumanAmount, TokenPair};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("hop {hop} on {venue}: {source}")]
    Quote {
        hop: u8,
        venue: Venue,
        #[source]
        source: QuoteError,
    },
    #[error(transparent)]
    Amount(#[from] AmountError),
}

pub struct RouteSimulator {
    uniswap: Arc<dyn QuoteSource>,
    sushiswap: Arc<dyn QuoteSource>,
    tokens: TokenPair,
    trade_sizes: TradeSizes,
}

impl RouteSimulator {
    pub fn new(
        uniswap: Arc<dyn QuoteSource>,
        sushiswap: Arc<dyn QuoteSource>,
        tokens: TokenPair,
        trade_sizes: TradeSizes,
    ) -> Self {
        Self {
            uniswap,
            sushiswap,
            tokens,
            trade_sizes,
        }
    }

    fn source(&self, venue: Venue) -> &dyn QuoteSource {
        match venue {
            Venue::UniswapV3 => self.uniswap.as_ref(),
            Venue::SushiSwap => self.sushiswap.as_ref(),
        }
    }

    /// Gross profit of one route in its starting token
    pub async fn simulate(&self, route: RouteId) -> Result<HumanAmount, SimulationError> {
        let start = self.tokens.token(route.start());
        let intermediate = self.tokens.token(route.start().other());
        let (first, second) = route.venues();

        let amount_in = self.trade_sizes.for_side(route.start());
        let initial = start.to_human(amount_in)?;

        let first = self.source(first);
        let hop1 = first
            .quote(start, intermediate, amount_in)
            .await
            .map_err(|source| SimulationError::Quote {
                hop: 1,
                venue: first.venue(),
                source,
            })?;

        let intermediate_in = intermediate.to_base_units(hop1.amount_out)?;

        let second = self.source(second);
        let hop2 = second
            .quote(intermediate, start, intermediate_in)
            .await
            .map_err(|source| SimulationError::Quote {
                hop: 2,
                venue: second.venue(),
                source,
            })?;

        Ok(hop2.amount_out - initial)
    }

    /// Simulate all four routes. A failure in one route never affects another.
    pub async fn simulate_all(&self) -> BTreeMap<RouteId, RouteResult> {
        let mut results = BTreeMap::new();
        for route in RouteId::ALL {
            let start = self.tokens.token(route.start());
            let result = match self.simulate(route).await {
                Ok(profit) => {
                    info!(route = %route, profit = %profit, token = %start.symbol, "simulated {}", route.describe());
                    Some(profit)
                }
                Err(e) => {
                    warn!(route = %route, pair = %self.tokens.symbol(), "unavailable: {}", e);
                    None
                }
            };
            results.insert(route, result);
        }
        results
    }
}
