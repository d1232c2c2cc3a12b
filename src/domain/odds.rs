//! Combined odds for parlay slips.
//!
//! A parlay pays the product of its legs' odds. Both the combined odd and
//! the potential win are rounded to 2 decimal places (half-up).

use rust_decimal::Decimal;

use super::money::{round_money, Amount, Odd};

/// Product of all odds, rounded to 2 decimal places.
///
/// A missing or zero odd counts as 1 so a malformed leg never zeroes the
/// slip. An empty input returns 0, which callers treat as a failed
/// validation rather than a priced bet.
#[must_use]
pub fn combined_odd<I>(odds: I) -> Odd
where
    I: IntoIterator<Item = Option<Odd>>,
{
    let mut odds = odds.into_iter().peekable();
    if odds.peek().is_none() {
        return Decimal::ZERO;
    }

    let product = odds.fold(Decimal::ONE, |total, odd| {
        let odd = odd.filter(|o| !o.is_zero()).unwrap_or(Decimal::ONE);
        total.saturating_mul(odd)
    });
    round_money(product)
}

/// Stake multiplied by the combined odd, rounded to 2 decimal places.
#[must_use]
pub fn potential_win(stake: Amount, combined_odd: Odd) -> Amount {
    round_money(stake.saturating_mul(combined_odd))
}
