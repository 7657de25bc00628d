//! Safety Governor
//!
//! Per-account trade counter with a periodic reset. The counter is always
//! maintained; whether it blocks dispatch is an explicit configuration
//! choice (`enforce_trade_limit`, off by default).

use crate::config::SafetyConfig;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Mutable account state, owned by the decision loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    /// Settlement transactions submitted since the last reset
    pub trade_count: u32,
    /// When `trade_count` next resets to zero
    pub next_reset: DateTime<Utc>,
}

impl AccountState {
    pub fn new(now: DateTime<Utc>, period: Duration) -> Self {
        Self {
            trade_count: 0,
            next_reset: now + period,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SafetyGovernor {
    period: Duration,
    max_trades_per_day: u32,
    enforce_trade_limit: bool,
}

impl SafetyGovernor {
    pub fn new(config: &SafetyConfig) -> Self {
        Self {
            period: config.reset_period,
            max_trades_per_day: config.max_trades_per_day,
            enforce_trade_limit: config.enforce_trade_limit,
        }
    }

    pub fn max_trades_per_day(&self) -> u32 {
        self.max_trades_per_day
    }

    pub fn initial_state(&self, now: DateTime<Utc>) -> AccountState {
        AccountState::new(now, self.period)
    }

    /// Zero the counter once `now` reaches `next_reset`, then advance
    /// `next_reset` by exactly one period. After a stall longer than one
    /// period the new boundary is still behind `now`, so the next call
    /// resets again. Returns true when a reset happened.
    pub fn reset_if_due(&self, state: &mut AccountState, now: DateTime<Utc>) -> bool {
        if now < state.next_reset {
            return false;
        }
        info!(
            "Resetting trade counter ({} trades in the last period)",
            state.trade_count
        );
        state.trade_count = 0;
        state.next_reset = state.next_reset + self.period;
        true
    }

    /// Whether another dispatch is allowed under the configured limit
    pub fn permits_trade(&self, state: &AccountState) -> bool {
        !self.enforce_trade_limit || state.trade_count < self.max_trades_per_day
    }

    pub fn record_trade(&self, state: &mut AccountState) {
        state.trade_count = state.trade_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn governor(enforce: bool) -> SafetyGovernor {
        SafetyGovernor::new(&SafetyConfig {
            max_trades_per_day: 2,
            reset_period: Duration::hours(24),
            enforce_trade_limit: enforce,
        })
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = governor(false).initial_state(t0());
        assert_eq!(state.trade_count, 0);
        assert_eq!(state.next_reset, t0() + Duration::hours(24));
    }

    #[test]
    fn test_no_reset_before_deadline() {
        let gov = governor(false);
        let mut state = gov.initial_state(t0());
        state.trade_count = 5;
        assert!(!gov.reset_if_due(&mut state, t0() + Duration::hours(23)));
        assert_eq!(state.trade_count, 5);
    }

    #[test]
    fn test_reset_at_deadline_advances_one_period() {
        let gov = governor(false);
        let mut state = gov.initial_state(t0());
        state.trade_count = 5;
        let deadline = state.next_reset;
        assert!(gov.reset_if_due(&mut state, deadline));
        assert_eq!(state.trade_count, 0);
        assert_eq!(state.next_reset, deadline + Duration::hours(24));
    }

    #[test]
    fn test_reset_after_long_stall_advances_one_period() {
        let gov = governor(false);
        let mut state = gov.initial_state(t0());
        state.trade_count = 3;
        let before = state.next_reset;
        let now = t0() + Duration::hours(73);

        assert!(gov.reset_if_due(&mut state, now));
        assert_eq!(state.trade_count, 0);
        assert_eq!(state.next_reset, before + Duration::hours(24));

        // Still behind, so the following cycle resets once more
        state.trade_count = 1;
        assert!(gov.reset_if_due(&mut state, now));
        assert_eq!(state.trade_count, 0);
        assert_eq!(state.next_reset, before + Duration::hours(48));
    }

    #[test]
    fn test_limit_not_enforced_by_default() {
        let gov = governor(false);
        let mut state = gov.initial_state(t0());
        state.trade_count = 100;
        assert!(gov.permits_trade(&state));
    }

    #[test]
    fn test_limit_enforced_when_enabled() {
        let gov = governor(true);
        let mut state = gov.initial_state(t0());
        assert!(gov.permits_trade(&state));
        gov.record_trade(&mut state);
        gov.record_trade(&mut state);
        assert_eq!(state.trade_count, 2);
        assert!(!gov.permits_trade(&state));
    }
}
