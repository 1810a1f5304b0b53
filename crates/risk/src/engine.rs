//! Solvency and health checks
//!
//! Units: `collateral * price` is compared against `debt * ratio / 100`.
//! Ratios are whole percents (150 = 150%).

use lendcore_core::math::{checked_percent_of, safe_multiply, PERCENT};

/// Health factor reads exactly this value at the liquidation threshold
pub const HEALTH_FACTOR_SCALE: u64 = 100;

/// `collateral * price`, with overflow collapsing to 0.
///
/// An overflowed value is treated as worthless, never as unbounded.
pub fn collateral_value(collateral: u64, price: u64) -> u64 {
    safe_multiply(collateral, price).unwrap_or(0)
}

/// `debt * ratio_percent / 100`, saturating at `u64::MAX`.
///
/// Saturating keeps an overflowed requirement unreachable instead of free.
pub fn required_collateral(debt: u64, ratio_percent: u64) -> u64 {
    checked_percent_of(debt, ratio_percent).unwrap_or(u64::MAX)
}

/// `debt == 0 || collateral_value >= required_collateral(debt, ratio)`
pub fn is_solvent(collateral: u64, debt: u64, price: u64, ratio_percent: u64) -> bool {
    debt == 0 || collateral_value(collateral, price) >= required_collateral(debt, ratio_percent)
}

/// `debt > 0 && collateral * price < debt * threshold / 100`
///
/// Exact in `u128`: an overflowing product never reads as zero value here.
pub fn is_liquidatable(collateral: u64, debt: u64, price: u64, threshold_percent: u64) -> bool {
    debt > 0 && wide_value(collateral, price) < wide_required(debt, threshold_percent)
}

fn wide_value(collateral: u64, price: u64) -> u128 {
    u128::from(collateral) * u128::from(price)
}

fn wide_required(debt: u64, ratio_percent: u64) -> u128 {
    u128::from(debt) * u128::from(ratio_percent) / u128::from(PERCENT)
}

/// Collateral value over threshold-required collateral, scaled by 100.
///
/// `hf = collateral_value * 100 / (debt * threshold / 100)`
///
/// 100 means exactly at the liquidation threshold; above is safe, below is
/// liquidatable. Value 1000, debt 500, threshold 120 gives 166.
///
/// `None` when there is no debt, no price, or the requirement rounds to 0.
/// Computed in `u128` like [`is_liquidatable`] and saturating at `u64::MAX`.
pub fn health_factor(collateral: u64, debt: u64, price: u64, threshold_percent: u64) -> Option<u64> {
    if debt == 0 || price == 0 {
        return None;
    }
    let required = wide_required(debt, threshold_percent);
    if required == 0 {
        return None;
    }
    let hf = wide_value(collateral, price)
        .checked_mul(u128::from(HEALTH_FACTOR_SCALE))
        .map_or(u128::MAX, |scaled| scaled / required);
    Some(u64::try_from(hf).unwrap_or(u64::MAX))
}

/// Additional debt the position could take on and stay solvent at `ratio_percent`
pub fn max_borrowable(collateral: u64, debt: u64, price: u64, ratio_percent: u64) -> u64 {
    if ratio_percent == 0 {
        return 0;
    }
    let value = collateral_value(collateral, price);
    // Largest d with d * ratio / 100 <= value  =>  d <= (value * 100 + 99) / ratio
    let max_debt = match safe_multiply(value, PERCENT) {
        Some(scaled) => scaled.saturating_add(PERCENT - 1) / ratio_percent,
        None => (value / ratio_percent).saturating_mul(PERCENT),
    };
    max_debt.saturating_sub(debt)
}
