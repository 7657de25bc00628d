//! Route Selector

use super::normalizer::NormalizedProfits;
use super::route::RouteId;
use crate::types::HumanAmount;
use serde::Serialize;

/// Winner of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeDecision {
    pub route: RouteId,
    /// Net profit in the reference currency
    pub net_profit: HumanAmount,
    /// Profit is strictly positive. Collateral is checked at dispatch.
    pub execute: bool,
}

/// Pick the route with the strictly greatest present profit.
///
/// Returns `None` when no route has a value ("no opportunity"). Routes are
/// visited in A..D order and a later route only wins by being strictly
/// greater, so ties go to the earlier route.
pub fn select(profits: &NormalizedProfits) -> Option<TradeDecision> {
    profits
        .iter()
        .filter_map(|(route, profit)| profit.map(|p| (*route, p)))
        .fold(None, |best: Option<(RouteId, HumanAmount)>, (route, profit)| match best {
            Some((_, best_profit)) if best_profit >= profit => best,
            _ => Some((route, profit)),
        })
        .map(|(route, net_profit)| TradeDecision {
            route,
            net_profit,
            execute: net_profit > HumanAmount::ZERO,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profits(values: [Option<HumanAmount>; 4]) -> NormalizedProfits {
        RouteId::ALL.into_iter().zip(values).collect()
    }

    #[test]
    fn test_select_strict_maximum() {
        let decision = select(&profits([Some(dec!(1)), Some(dec!(4)), Some(dec!(-2)), Some(dec!(3.9))])).unwrap();
        assert_eq!(decision.route, RouteId::B);
        assert_eq!(decision.net_profit, dec!(4));
        assert!(decision.execute);
    }

    #[test]
    fn test_select_ignores_absent_routes() {
        let decision = select(&profits([None, None, Some(dec!(-3)), None])).unwrap();
        assert_eq!(decision.route, RouteId::C);
        assert!(!decision.execute);
    }

    #[test]
    fn test_select_no_opportunity_when_all_absent() {
        assert_eq!(select(&profits([None, None, None, None])), None);
    }

    #[test]
    fn test_select_ties_go_to_earliest_route() {
        let decision = select(&profits([None, Some(dec!(2)), Some(dec!(2)), Some(dec!(2))])).unwrap();
        assert_eq!(decision.route, RouteId::B);

        let decision = select(&profits([Some(dec!(2)), Some(dec!(2)), None, None])).unwrap();
        assert_eq!(decision.route, RouteId::A);
    }

    #[test]
    fn test_zero_profit_does_not_execute() {
        let decision = select(&profits([Some(dec!(0)), Some(dec!(-1)), None, None])).unwrap();
        assert_eq!(decision.route, RouteId::A);
        assert!(!decision.execute);
    }

    #[test]
    fn test_absent_route_never_selected_over_negative() {
        let decision = select(&profits([None, Some(dec!(-0.01)), None, None])).unwrap();
        assert_eq!(decision.route, RouteId::B);
    }
}
