//! Geometric cost curve shared by slot and suit upgrades.
//!
//! Level `k` (zero-based) of an upgrade whose next level costs `base` is priced
//! at `base * r^k` with `r = 1.08`.

use crate::number::BigNumber;

pub const COST_GROWTH: f64 = 1.08;

/// Upper bound for [`max_buyable`], far beyond any budget a `BigNumber` can
/// express at `r = 1.08`.
const MAX_LEVELS: u64 = 1 << 62;

fn growth() -> BigNumber {
    BigNumber::from(COST_GROWTH)
}

/// Total price of the next `n` levels: `base * (1 + r*(r^(n-1) - 1)/(r-1))`.
pub fn cost_for_n(base: BigNumber, n: u64) -> BigNumber {
    if n == 0 {
        return BigNumber::ZERO;
    }
    let r = growth();
    let tail = r * (r.powi(n - 1) - BigNumber::ONE) / (r - BigNumber::ONE);
    base * (BigNumber::ONE + tail)
}

/// Price of the level after buying `n` levels: `base * r^n`.
pub fn cost_after_n(base: BigNumber, n: u64) -> BigNumber {
    base * growth().powi(n)
}

/// Largest `n >= 1` with `cost_for_n(base, n) <= budget`; `1` when not even
/// one level is affordable, so callers must still check the single-level
/// price themselves.
pub fn max_buyable(base: BigNumber, budget: BigNumber) -> u64 {
    let affordable = |n: u64| cost_for_n(base, n) <= budget;
    if !affordable(1) {
        return 1;
    }
    // Gallop to bracket the answer, then bisect: affordable(lo) && !affordable(hi)
    let mut lo = 1u64;
    let mut hi = 2u64;
    while affordable(hi) {
        lo = hi;
        if hi >= MAX_LEVELS {
            return MAX_LEVELS;
        }
        hi = hi.saturating_mul(2).min(MAX_LEVELS);
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if affordable(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> BigNumber {
        BigNumber::from(v)
    }

    #[test]
    fn zero_levels_cost_nothing() {
        assert_eq!(cost_for_n(n(10.0), 0), BigNumber::ZERO);
    }

    #[test]
    fn first_levels_are_exact() {
        assert_eq!(cost_for_n(n(10.0), 1), n(10.0));
        assert!(cost_for_n(n(10.0), 2).approx_eq(&n(20.8), 1e-12));
        assert!(cost_after_n(n(10.0), 1).approx_eq(&n(10.8), 1e-12));
        assert_eq!(cost_after_n(n(10.0), 0), n(10.0));
    }

    #[test]
    fn no_integer_rounding_between_levels() {
        let c = cost_after_n(n(10.0), 3);
        assert!(c.approx_eq(&n(12.597_12), 1e-12));
    }

    #[test]
    fn max_buyable_small_budgets() {
        // 10 + 10.8 = 20.8; + 11.664 = 32.464
        assert_eq!(max_buyable(n(10.0), n(5.0)), 1);
        assert_eq!(max_buyable(n(10.0), n(10.0)), 1);
        assert_eq!(max_buyable(n(10.0), n(20.9)), 2);
        assert_eq!(max_buyable(n(10.0), n(32.0)), 2);
        assert_eq!(max_buyable(n(10.0), n(32.5)), 3);
    }

    #[test]
    fn max_buyable_huge_budget_stays_finite() {
        let levels = max_buyable(n(10.0), BigNumber::new(1.0, 100));
        assert!(levels > 2_000 && levels < 3_500);
        assert!(cost_for_n(n(10.0), levels) <= BigNumber::new(1.0, 100));
        assert!(cost_for_n(n(10.0), levels + 1) > BigNumber::new(1.0, 100));
    }
}
