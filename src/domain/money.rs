//! Monetary types for stakes, odds and balances.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::DomainError;

/// Currency amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Decimal odd (e.g. 2.50 pays 2.5x the stake).
pub type Odd = Decimal;

/// Number of decimal places kept for amounts and combined odds.
pub const MONEY_SCALE: u32 = 2;

const MINOR_PER_UNIT: i64 = 100;

/// Round to 2 decimal places, half-up (midpoint away from zero).
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer minor units (1.00 = 100).
///
/// # Errors
/// Returns [`DomainError::UnrepresentableAmount`] if the amount carries more
/// than 2 decimal places or does not fit in an `i64`.
pub fn to_minor(amount: Amount) -> Result<i64, DomainError> {
    let scaled = amount
        .checked_mul(Decimal::from(MINOR_PER_UNIT))
        .ok_or(DomainError::UnrepresentableAmount { amount })?;
    if scaled.fract() != Decimal::ZERO {
        return Err(DomainError::UnrepresentableAmount { amount });
    }
    scaled
        .to_i64()
        .ok_or(DomainError::UnrepresentableAmount { amount })
}

/// Check that an amount fits the ledger: at most 2 decimal places, within
/// the minor-unit range.
///
/// # Errors
/// Returns [`DomainError::UnrepresentableAmount`] otherwise.
pub fn ensure_representable(amount: Amount) -> Result<(), DomainError> {
    to_minor(amount).map(|_| ())
}

/// Convert integer minor units back to an amount with 2 decimal places.
#[must_use]
pub fn from_minor(minor: i64) -> Amount {
    Decimal::new(minor, MONEY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_money_is_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn minor_units_roundtrip_whole_and_fractional() {
        assert_eq!(to_minor(dec!(900.00)).unwrap(), 90_000);
        assert_eq!(to_minor(dec!(0.07)).unwrap(), 7);
        assert_eq!(from_minor(90_000), dec!(900.00));
    }

    #[test]
    fn representable_amounts_ignore_trailing_zeros() {
        assert!(ensure_representable(dec!(12.500)).is_ok());
        assert!(ensure_representable(dec!(12.505)).is_err());
        assert!(ensure_representable(Decimal::MAX).is_err());
    }

    #[test]
    fn to_minor_rejects_sub_cent_precision() {
        assert!(matches!(
            to_minor(dec!(1.001)),
            Err(DomainError::UnrepresentableAmount { .. })
        ));
    }
}
