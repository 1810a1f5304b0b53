//! Overflow-safe integer arithmetic
//!
//! Every primitive here degrades to a sentinel (`None` or `0`) instead of
//! panicking. Callers must treat the sentinel as closing a path, never as
//! opening one: a zero collateral value is "worth nothing", not "needs
//! nothing".

/// Denominator for all percentage parameters (150 = 150%)
pub const PERCENT: u64 = 100;

/// `a * b`, or `None` if the product does not fit in a `u64`
#[inline]
pub fn safe_multiply(a: u64, b: u64) -> Option<u64> {
    a.checked_mul(b)
}

/// Truncating `a / b`, or `None` if `b == 0`
#[inline]
pub fn safe_divide(a: u64, b: u64) -> Option<u64> {
    a.checked_div(b)
}

/// `amount * percent / 100`, or `None` on overflow
pub fn checked_percent_of(amount: u64, percent: u64) -> Option<u64> {
    safe_divide(safe_multiply(amount, percent)?, PERCENT)
}

/// `amount * percent / 100`, degrading to `0` on overflow.
///
/// A `0` result is ambiguous: it is either the true answer or a failed
/// computation. Use [`checked_percent_of`] wherever that matters.
pub fn percent_of(amount: u64, percent: u64) -> u64 {
    checked_percent_of(amount, percent).unwrap_or(0)
}

/// Absolute change from `old` to `new`, in whole percent of `old`.
///
/// `None` when `old == 0` (no baseline) or the intermediate overflows.
pub fn percent_change(old: u64, new: u64) -> Option<u64> {
    if old == 0 {
        return None;
    }
    let delta = old.abs_diff(new);
    safe_divide(safe_multiply(delta, PERCENT)?, old)
}
