//! Profit Normalizer
//!
//! Brings the four gross route profits into the reference currency and
//! subtracts the cycle's gas estimate.
//!
//! Routes that start in the non-reference token share one conversion rate
//! (one unit of that token -> reference), fetched once per cycle. If that
//! rate is unavailable those routes become unavailable: a route-level
//! conversion fails closed, unlike the gas estimate which fails open.

use super::gas::GasEstimate;
use super::route::{RouteId, RouteResult};
use crate::quoter::QuoteSource;
use crate::types::{HumanAmount, Side, TokenPair};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Net profit per route in the reference currency; `None` = unavailable
pub type NormalizedProfits = BTreeMap<RouteId, Option<HumanAmount>>;

pub struct ProfitNormalizer {
    rate_source: Arc<dyn QuoteSource>,
    tokens: TokenPair,
    reference: Side,
}

impl ProfitNormalizer {
    pub fn new(rate_source: Arc<dyn QuoteSource>, tokens: TokenPair, reference: Side) -> Self {
        Self {
            rate_source,
            tokens,
            reference,
        }
    }

    /// One unit of the non-reference token priced in the reference token
    async fn conversion_rate(&self) -> Option<HumanAmount> {
        let from = self.tokens.token(self.reference.other());
        let to = self.tokens.token(self.reference);
        match self.rate_source.quote(from, to, from.one_unit()).await {
            Ok(quote) => {
                debug!("Conversion rate: 1 {} = {} {}", from.symbol, quote.amount_out, to.symbol);
                Some(quote.amount_out)
            }
            Err(e) => {
                warn!(
                    "{} -> {} conversion unavailable, routes starting in {} dropped this cycle: {}",
                    from.symbol, to.symbol, from.symbol, e
                );
                None
            }
        }
    }

    pub async fn normalize(&self, gross: &BTreeMap<RouteId, RouteResult>, gas: &GasEstimate) -> NormalizedProfits {
        let needs_rate = gross
            .iter()
            .any(|(route, profit)| route.start() != self.reference && profit.is_some());
        let rate = if needs_rate {
            self.conversion_rate().await
        } else {
            None
        };
        apply(gross, self.reference, rate, gas.cost)
    }
}

/// Convert and net out gas. Pure; `rate` is the shared non-reference -> reference rate.
pub fn apply(
    gross: &BTreeMap<RouteId, RouteResult>,
    reference: Side,
    rate: Option<HumanAmount>,
    gas_cost: HumanAmount,
) -> NormalizedProfits {
    RouteId::ALL
        .iter()
        .map(|route| {
            let profit = gross.get(route).copied().flatten();
            let in_reference = if route.start() == reference {
                profit
            } else {
                profit.zip(rate).map(|(p, r)| p * r)
            };
            (*route, in_reference.map(|p| p - gas_cost))
        })
        .collect()
}
