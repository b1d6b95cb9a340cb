//! Exact rational prices.
//!
//! The ledger quotes every order as `price_num / price_den` quote units per
//! base unit. Prices stay rational end to end; ordering and crossing tests
//! live in `ledgermatch-matchcore::comparator` and never go through a
//! floating or fixed-point approximation.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{LedgerMatchError, Result};

/// A price of `num / den` quote units per base unit. `den` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Price {
    num: u128,
    den: u128,
}

impl Price {
    /// Build a price, rejecting a zero denominator.
    pub fn new(num: u128, den: u128) -> Result<Self> {
        if den == 0 {
            return Err(LedgerMatchError::ZeroDenominator { num });
        }
        Ok(Self { num, den })
    }

    /// Whole-unit price `num / 1`.
    #[must_use]
    pub fn whole(num: u128) -> Self {
        Self { num, den: 1 }
    }

    #[must_use]
    pub fn num(&self) -> u128 {
        self.num
    }

    #[must_use]
    pub fn den(&self) -> u128 {
        self.den
    }

    /// Decimal rendering for logs only. `None` when either part exceeds the
    /// decimal mantissa.
    #[must_use]
    pub fn approx_decimal(&self) -> Option<Decimal> {
        let num = Decimal::try_from_i128_with_scale(i128::try_from(self.num).ok()?, 0).ok()?;
        let den = Decimal::try_from_i128_with_scale(i128::try_from(self.den).ok()?, 0).ok()?;
        num.checked_div(den)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_rejected() {
        let err = Price::new(3, 0).unwrap_err();
        assert!(matches!(err, LedgerMatchError::ZeroDenominator { num: 3 }));
    }

    #[test]
    fn zero_numerator_allowed() {
        let p = Price::new(0, 5).unwrap();
        assert_eq!(p.num(), 0);
    }

    #[test]
    fn display_is_rational() {
        assert_eq!(Price::new(7, 2).unwrap().to_string(), "7/2");
        assert_eq!(Price::whole(3).to_string(), "3/1");
    }

    #[test]
    fn approx_decimal_for_logs() {
        assert_eq!(
            Price::new(7, 2).unwrap().approx_decimal(),
            Some(Decimal::new(35, 1))
        );
        assert_eq!(Price::new(u128::MAX, 1).unwrap().approx_decimal(), None);
    }
}
