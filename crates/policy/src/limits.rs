//! Per-asset time-windowed spending limits.
//!
//! Windows are fixed-size and aligned to multiples of the duration (not a
//! sliding average), and the reset is lazy: accumulated spend is only
//! folded forward when an accounting call observes that the aligned window
//! start has advanced. A consequence, preserved deliberately: spends of up
//! to the full limit on each side of a window boundary both succeed, so up
//! to twice the limit can move within an arbitrarily short real interval
//! straddling the boundary. Operators needing a rolling bound must size the
//! limit accordingly.

use crate::{Address, Error, Result};
use std::collections::HashMap;

/// Configuration and live accounting state for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendingLimit {
    /// Maximum cumulative spend per window. Zero means unlimited
    /// (accounting disabled for the asset).
    pub limit_per_window: u128,
    /// Window size in seconds.
    pub window_duration: u64,
    /// Spend accumulated in the window starting at `window_start`.
    pub spent_in_window: u128,
    /// Aligned start of the window `spent_in_window` is valid for.
    pub window_start: u64,
}

impl SpendingLimit {
    pub fn is_unlimited(&self) -> bool {
        self.limit_per_window == 0
    }

    fn current_window_start(&self, now: u64) -> u64 {
        now / self.window_duration * self.window_duration
    }
}

/// A spend committed against a limit, reported for event emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedSpend {
    pub asset: Address,
    pub amount: u128,
    /// Running total for the current window after this spend.
    pub spent_in_window: u128,
}

/// Remaining headroom in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitStatus {
    pub remaining: u128,
    /// End of the current window, Unix seconds.
    pub window_end: u64,
}

/// The per-asset spending limit table.
#[derive(Debug, Clone, Default)]
pub struct SpendingLimits {
    limits: HashMap<Address, SpendingLimit>,
}

impl SpendingLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the limit for an asset, resetting its accounting state.
    /// A nonzero limit requires a nonzero window duration; a zero limit
    /// disables accounting.
    pub fn set(&mut self, asset: Address, limit_per_window: u128, window_duration: u64) -> Result<()> {
        if asset.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        if limit_per_window != 0 && window_duration == 0 {
            return Err(Error::InvalidWindow);
        }
        self.limits.insert(
            asset,
            SpendingLimit {
                limit_per_window,
                window_duration,
                spent_in_window: 0,
                window_start: 0,
            },
        );
        Ok(())
    }

    pub fn get(&self, asset: Address) -> Option<SpendingLimit> {
        self.limits.get(&asset).copied()
    }

    /// Account for a spend of `amount` on `asset` at time `now`.
    ///
    /// Unconfigured and unlimited assets pass through untouched. Otherwise
    /// the window is lazily reset if `now` has crossed into a later aligned
    /// window, the spend is checked against the limit, and the running
    /// total is updated. Failure mutates nothing.
    pub fn record_spend(
        &mut self,
        asset: Address,
        amount: u128,
        now: u64,
    ) -> Result<Option<RecordedSpend>> {
        let Some(limit) = self.limits.get_mut(&asset) else {
            return Ok(None);
        };
        if limit.is_unlimited() {
            return Ok(None);
        }

        let window_start = limit.current_window_start(now);
        if window_start > limit.window_start {
            limit.spent_in_window = 0;
            limit.window_start = window_start;
        }

        let spent = limit
            .spent_in_window
            .checked_add(amount)
            .filter(|spent| *spent <= limit.limit_per_window)
            .ok_or(Error::SpendingLimitExceeded {
                asset,
                amount,
                limit: limit.limit_per_window,
            })?;

        limit.spent_in_window = spent;
        Ok(Some(RecordedSpend {
            asset,
            amount,
            spent_in_window: spent,
        }))
    }

    /// Remaining headroom for `asset` at time `now`, without mutating any
    /// state. A query past a window boundary reports the reset view.
    /// `None` when the asset is unconfigured or unlimited.
    pub fn remaining(&self, asset: Address, now: u64) -> Option<LimitStatus> {
        let limit = self.limits.get(&asset)?;
        if limit.is_unlimited() {
            return None;
        }
        let window_start = limit.current_window_start(now);
        let spent = if window_start > limit.window_start {
            0
        } else {
            limit.spent_in_window
        };
        Some(LimitStatus {
            remaining: limit.limit_per_window.saturating_sub(spent),
            window_end: window_start + limit.window_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: Address = Address([1; 20]);
    const HOUR: u64 = 3600;

    fn limits(limit: u128, window: u64) -> SpendingLimits {
        let mut table = SpendingLimits::new();
        table.set(ASSET, limit, window).unwrap();
        table
    }

    #[test]
    fn accumulates_within_a_window() {
        let mut table = limits(100, 6 * HOUR);

        let spend = table.record_spend(ASSET, 30, 100).unwrap().unwrap();
        assert_eq!(spend.spent_in_window, 30);

        let spend = table.record_spend(ASSET, 70, 200).unwrap().unwrap();
        assert_eq!(spend.spent_in_window, 100);

        assert!(matches!(
            table.record_spend(ASSET, 1, 300),
            Err(Error::SpendingLimitExceeded {
                asset: ASSET,
                amount: 1,
                limit: 100,
            })
        ));
        // Failure mutates nothing.
        assert_eq!(table.get(ASSET).unwrap().spent_in_window, 100);
    }

    #[test]
    fn lazy_reset_after_window_elapses() {
        let mut table = limits(100, 6 * HOUR);
        table.record_spend(ASSET, 100, 0).unwrap();

        // Well past the boundary: reset happens at spend time, however far
        // past the boundary the spend occurs.
        let spend = table
            .record_spend(ASSET, 40, 6 * HOUR + 5000)
            .unwrap()
            .unwrap();
        assert_eq!(spend.spent_in_window, 40);
        assert_eq!(table.get(ASSET).unwrap().window_start, 6 * HOUR);
    }

    #[test]
    fn boundary_double_spend_is_preserved() {
        let mut table = limits(100, 6 * HOUR);

        // Full limit in the instant before the boundary...
        table.record_spend(ASSET, 100, 6 * HOUR - 1).unwrap().unwrap();
        // ...and the full limit again in the instant after.
        let spend = table.record_spend(ASSET, 100, 6 * HOUR).unwrap().unwrap();
        assert_eq!(spend.spent_in_window, 100);
    }

    #[test]
    fn six_hour_scenario() {
        let mut table = limits(100, 6 * HOUR);

        table.record_spend(ASSET, 100, 0).unwrap().unwrap();
        assert_eq!(table.remaining(ASSET, 0).unwrap().remaining, 0);

        assert!(matches!(
            table.record_spend(ASSET, 1, HOUR),
            Err(Error::SpendingLimitExceeded { amount: 1, limit: 100, .. })
        ));

        let spend = table
            .record_spend(ASSET, 100, 6 * HOUR + 1)
            .unwrap()
            .unwrap();
        assert_eq!(spend.spent_in_window, 100);
        assert_eq!(table.remaining(ASSET, 6 * HOUR + 1).unwrap().remaining, 0);
    }

    #[test]
    fn zero_limit_disables_accounting() {
        let mut table = limits(0, 0);
        assert!(table.record_spend(ASSET, u128::MAX, 50).unwrap().is_none());
        assert!(table.remaining(ASSET, 50).is_none());
    }

    #[test]
    fn unconfigured_asset_passes_through() {
        let mut table = SpendingLimits::new();
        assert!(table.record_spend(ASSET, 1_000_000, 0).unwrap().is_none());
    }

    #[test]
    fn nonzero_limit_requires_a_window() {
        let mut table = SpendingLimits::new();
        assert!(matches!(table.set(ASSET, 100, 0), Err(Error::InvalidWindow)));
        table.set(ASSET, 0, 0).unwrap();
    }

    #[test]
    fn remaining_reports_window_end() {
        let mut table = limits(100, 6 * HOUR);
        table.record_spend(ASSET, 60, HOUR).unwrap();

        let status = table.remaining(ASSET, 2 * HOUR).unwrap();
        assert_eq!(status.remaining, 40);
        assert_eq!(status.window_end, 6 * HOUR);

        // Query past the boundary reports the reset view without mutating.
        let status = table.remaining(ASSET, 7 * HOUR).unwrap();
        assert_eq!(status.remaining, 100);
        assert_eq!(status.window_end, 12 * HOUR);
        assert_eq!(table.get(ASSET).unwrap().spent_in_window, 60);
    }

    #[test]
    fn reconfiguring_resets_accounting() {
        let mut table = limits(100, 6 * HOUR);
        table.record_spend(ASSET, 80, 0).unwrap();

        table.set(ASSET, 50, 6 * HOUR).unwrap();
        let limit = table.get(ASSET).unwrap();
        assert_eq!(limit.spent_in_window, 0);
        assert_eq!(limit.limit_per_window, 50);
    }
}
