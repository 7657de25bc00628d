//! The four fixed round-trip routes and their settlement entry points
//!
//! | Route | Start | Hop 1                | Hop 2                | Entry point                        |
//! |-------|-------|----------------------|----------------------|------------------------------------|
//! | A     | base  | base→quote UniswapV3 | quote→base SushiSwap | executeArbitrageWithMagic          |
//! | B     | base  | base→quote SushiSwap | quote→base UniswapV3 | executeArbitrageWithMagicReverse   |
//! | C     | quote | quote→base UniswapV3 | base→quote SushiSwap | executeArbitrageReverse            |
//! | D     | quote | quote→base SushiSwap | base→quote UniswapV3 | executeArbitrage                   |

use crate::quoter::Venue;
use crate::types::{HumanAmount, Side};
use serde::Serialize;
use std::fmt;

/// Route identifier. `Ord` follows enumeration order, which is also the
/// tie-break order for route selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RouteId {
    A,
    B,
    C,
    D,
}

impl RouteId {
    pub const ALL: [RouteId; 4] = [RouteId::A, RouteId::B, RouteId::C, RouteId::D];

    /// Token the round trip starts and ends in
    pub fn start(self) -> Side {
        match self {
            RouteId::A | RouteId::B => Side::Base,
            RouteId::C | RouteId::D => Side::Quote,
        }
    }

    /// Venues for (hop 1, hop 2)
    pub fn venues(self) -> (Venue, Venue) {
        match self {
            RouteId::A | RouteId::C => (Venue::UniswapV3, Venue::SushiSwap),
            RouteId::B | RouteId::D => (Venue::SushiSwap, Venue::UniswapV3),
        }
    }

    pub fn entry_point(self) -> SettlementEntry {
        match self {
            RouteId::A => SettlementEntry::BaseForward,
            RouteId::B => SettlementEntry::BaseReverse,
            RouteId::C => SettlementEntry::QuoteReverse,
            RouteId::D => SettlementEntry::QuoteForward,
        }
    }

    pub fn describe(self) -> String {
        let start = self.start();
        let (first, second) = self.venues();
        format!(
            "{}→{} via {}, {}→{} via {}",
            start,
            start.other(),
            first,
            start.other(),
            start,
            second
        )
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            RouteId::A => "A",
            RouteId::B => "B",
            RouteId::C => "C",
            RouteId::D => "D",
        };
        write!(f, "{}", s)
    }
}

/// Write functions on the settlement contract. Each takes one `amountIn`
/// and performs the whole round trip atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SettlementEntry {
    /// `executeArbitrageWithMagic`
    BaseForward,
    /// `executeArbitrageWithMagicReverse`
    BaseReverse,
    /// `executeArbitrage`
    QuoteForward,
    /// `executeArbitrageReverse`
    QuoteReverse,
}

impl SettlementEntry {
    /// Token family the entry point consumes (and needs as collateral)
    pub fn family(self) -> Side {
        match self {
            SettlementEntry::BaseForward | SettlementEntry::BaseReverse => Side::Base,
            SettlementEntry::QuoteForward | SettlementEntry::QuoteReverse => Side::Quote,
        }
    }

    pub fn function_name(self) -> &'static str {
        match self {
            SettlementEntry::BaseForward => "executeArbitrageWithMagic",
            SettlementEntry::BaseReverse => "executeArbitrageWithMagicReverse",
            SettlementEntry::QuoteForward => "executeArbitrage",
            SettlementEntry::QuoteReverse => "executeArbitrageReverse",
        }
    }
}

impl fmt::Display for SettlementEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.function_name())
    }
}

/// Gross profit of one simulated round trip, in the route's starting token.
/// `None` = a hop failed this cycle.
pub type RouteResult = Option<HumanAmount>;
