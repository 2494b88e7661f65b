//! Decimal helpers shared by the aggregators and classifiers

use bigdecimal::BigDecimal;

use crate::traits::NetTotal;

/// The additive identity
pub fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

/// Numeric zero test; `0.00` and `0` are both zero
pub fn is_zero(amount: &BigDecimal) -> bool {
    *amount == zero()
}

/// Round to `scale` decimal places
pub fn round_amount(amount: &BigDecimal, scale: i64) -> BigDecimal {
    amount.round(scale)
}

/// Render with exactly `scale` decimal places, e.g. `0` as `0.00`
pub fn format_amount(amount: &BigDecimal, scale: i64) -> String {
    amount.round(scale).with_scale(scale).to_string()
}

/// Stable ascending sort by net total
pub fn sort_by_net_total<T: NetTotal>(rows: &mut [T]) {
    rows.sort_by(|a, b| a.net_total().cmp(b.net_total()));
}

/// Whether net totals never decrease along the slice
pub fn is_sorted_by_net_total<T: NetTotal>(rows: &[T]) -> bool {
    rows.windows(2)
        .all(|pair| pair[0].net_total() <= pair[1].net_total())
}
