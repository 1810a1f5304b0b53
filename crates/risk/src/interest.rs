//! Interest helpers
//!
//! Simple and compound interest on a principal over a number of periods.
//! Nothing in the ledger accrues automatically; hosts that want accrual
//! compute it here and apply it through the regular operations.

use lendcore_core::math::{safe_divide, safe_multiply, PERCENT};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

/// Default rate per period (0.05% = ~18.25% over 365 periods)
pub const DEFAULT_PERIOD_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 4); // 0.0005

/// `principal * rate_percent * periods / 100`, `None` on overflow
pub fn simple_interest(principal: u64, rate_percent: u64, periods: u64) -> Option<u64> {
    let per_period = safe_multiply(principal, rate_percent)?;
    safe_divide(safe_multiply(per_period, periods)?, PERCENT)
}

/// Interest calculator with a fixed per-period rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestCalculator {
    /// Rate per period (e.g., 0.0005 for 0.05%)
    period_rate: Decimal,
}

impl InterestCalculator {
    /// Create a calculator with the default rate
    pub fn new() -> Self {
        Self {
            period_rate: DEFAULT_PERIOD_RATE,
        }
    }

    /// Create with a custom rate; negative rates are clamped to zero
    pub fn with_rate(period_rate: Decimal) -> Self {
        Self {
            period_rate: period_rate.max(Decimal::ZERO),
        }
    }

    pub fn period_rate(&self) -> Decimal {
        self.period_rate
    }

    /// Simple interest over `periods`, truncated to whole units
    pub fn simple(&self, principal: u64, periods: u64) -> Option<u64> {
        let interest = Decimal::from(principal)
            .checked_mul(self.period_rate)?
            .checked_mul(Decimal::from(periods))?;
        interest.trunc().to_u64()
    }

    /// Compound interest: `principal * (1 + rate)^periods - principal`,
    /// truncated to whole units. `None` if the result overflows.
    pub fn compound(&self, principal: u64, periods: u64) -> Option<u64> {
        let growth = (Decimal::ONE + self.period_rate).checked_powu(periods)?;
        let total = Decimal::from(principal).checked_mul(growth)?;
        (total - Decimal::from(principal)).trunc().to_u64()
    }
}

impl Default for InterestCalculator {
    fn default() -> Self {
        Self::new()
    }
}
