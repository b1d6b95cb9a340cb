//! Exact, division-free comparison of rational prices.
//!
//! For `A = an/ad` and `B = bn/bd` with positive denominators,
//! `A ≥ B ⟺ an·bd ≥ bn·ad`. Both products are formed in 256 bits, so the
//! comparison is exact for every pair of `u128` prices.

use std::cmp::Ordering;

use ledgermatch_types::Price;
use primitive_types::U256;

/// Exact product of two ledger integers. Two `u128` factors never exceed
/// 256 bits.
pub(crate) fn wide_mul(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Total order of two prices by value. `1/2` and `2/4` compare equal.
#[must_use]
pub fn cmp_price(a: &Price, b: &Price) -> Ordering {
    wide_mul(a.num(), b.den()).cmp(&wide_mul(b.num(), a.den()))
}

/// `a ≥ b`.
#[must_use]
pub fn ge(a: &Price, b: &Price) -> bool {
    cmp_price(a, b) != Ordering::Less
}

/// `a ≤ b`.
#[must_use]
pub fn le(a: &Price, b: &Price) -> bool {
    cmp_price(a, b) != Ordering::Greater
}

/// Does a buy at `bid` meet or exceed a sell at `ask`?
#[must_use]
pub fn crosses(bid: &Price, ask: &Price) -> bool {
    ge(bid, ask)
}
